//! Shutdown coordination for the gate's HTTP server.
//!
//! The controller owns the OS signal listener for as long as the server
//! runs, and remembers that shutdown was requested so a `stop` issued before
//! the server subscribed is not lost.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
    signal_listener: Mutex<Option<JoinHandle<()>>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
            signal_listener: Mutex::new(None),
        }
    }

    /// Receiver notified on the next trigger. Check
    /// [`is_triggered`](Self::is_triggered) after subscribing to catch an
    /// earlier one.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Request shutdown. Repeated calls are harmless.
    pub fn trigger(&self) {
        fire(&self.triggered, &self.tx);
    }

    /// Trigger on SIGINT or SIGTERM until [`stop_listening`](Self::stop_listening).
    pub fn listen_for_signals(&self) {
        let tx = self.tx.clone();
        let triggered = self.triggered.clone();
        let task = tokio::spawn(async move {
            let name = os_signal().await;
            tracing::info!(signal = name, "shutdown signal received");
            fire(&triggered, &tx);
        });
        if let Some(previous) = self.listener().replace(task) {
            previous.abort();
        }
    }

    /// Drop the signal listener; the default signal handling does not come
    /// back, but nothing reacts to signals any more either.
    pub fn stop_listening(&self) {
        if let Some(task) = self.listener().take() {
            task.abort();
        }
    }

    fn listener(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.signal_listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ShutdownController {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

fn fire(triggered: &AtomicBool, tx: &broadcast::Sender<()>) {
    triggered.store(true, Ordering::SeqCst);
    let _ = tx.send(());
}

async fn os_signal() -> &'static str {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_notifies_and_is_remembered() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        assert!(!controller.is_triggered());
        controller.trigger();
        controller.trigger();
        assert!(rx.recv().await.is_ok());
        assert!(controller.is_triggered());
    }

    #[tokio::test]
    async fn late_subscriber_sees_flag() {
        let controller = ShutdownController::new();
        controller.trigger();
        let _rx = controller.subscribe();
        assert!(controller.is_triggered());
    }

    #[tokio::test]
    async fn signal_listener_is_replaced_and_released() {
        let controller = ShutdownController::new();
        controller.listen_for_signals();
        controller.listen_for_signals();
        assert!(controller.listener().is_some());
        controller.stop_listening();
        assert!(controller.listener().is_none());
        assert!(!controller.is_triggered());
    }
}
