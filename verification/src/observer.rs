//! Hooks for counting gate events without tying the gate to a metrics stack.

/// Receives one call per notable event while a request moves through the
/// gate. Every method defaults to a no-op.
pub trait GateObserver: Send + Sync {
    fn request(&self) {}
    fn denied(&self) {}
    fn accepted(&self) {}
    fn rejected(&self) {}
    fn verifier_failed(&self) {}
    /// A ledger read failed and the request was admitted without a rate check.
    fn backend_read_failed(&self) {}
    /// A ledger write failed after the proof had been accepted.
    fn backend_write_failed(&self) {}
}

/// Ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GateObserver for NoopObserver {}
