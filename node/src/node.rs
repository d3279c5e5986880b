//! The gate node: wires backend, ledger, verifier, metrics and HTTP API.

use std::sync::Arc;

use axum::Router;

use gate_ledger::VerificationLedger;
use gate_rpc::{ApiState, RpcServer};
use gate_store::SharedBackend;
use gate_types::{Clock, SystemClock};
use gate_verification::{ProofVerifier, VerificationGate, WorldIdVerifier};

use crate::backend::open_backend;
use crate::config::GateConfig;
use crate::error::NodeError;
use crate::metrics::GateMetrics;
use crate::shutdown::ShutdownController;

pub struct GateNode {
    pub config: GateConfig,
    pub backend: SharedBackend,
    pub gate: Arc<VerificationGate>,
    pub metrics: Arc<GateMetrics>,
    pub shutdown: ShutdownController,
}

impl GateNode {
    /// Open the configured backend and build a gate that verifies proofs
    /// against the World ID cloud API.
    pub async fn new(config: GateConfig) -> Result<Self, NodeError> {
        let verifier = WorldIdVerifier::new(config.verifier.to_verifier_config())?;
        let backend = open_backend(&config.backend).await?;
        Self::with_parts(config, backend, Arc::new(verifier), Arc::new(SystemClock))
    }

    /// Assemble a node from already-built parts.
    pub fn with_parts(
        config: GateConfig,
        backend: SharedBackend,
        verifier: Arc<dyn ProofVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        let metrics = Arc::new(
            GateMetrics::new().map_err(|e| NodeError::Config(format!("metrics: {e}")))?,
        );
        let gate = VerificationGate::new(
            VerificationLedger::new(backend.clone()),
            config.cooldown(),
            verifier,
            clock,
        )
        .with_global_count(config.count_verifications)
        .with_observer(metrics.clone());

        Ok(Self {
            config,
            backend,
            gate: Arc::new(gate),
            metrics,
            shutdown: ShutdownController::new(),
        })
    }

    fn server(&self) -> RpcServer {
        let state = ApiState::new(self.gate.clone()).with_registry(self.metrics.registry.clone());
        RpcServer::new(
            self.config.listen_addr,
            state,
            self.config.allowed_origins.clone(),
        )
    }

    /// The HTTP API without binding a socket.
    pub fn router(&self) -> Result<Router, NodeError> {
        Ok(self.server().router()?)
    }

    /// Serve the HTTP API until SIGINT/SIGTERM or [`ShutdownController::trigger`].
    pub async fn start(&self) -> Result<(), NodeError> {
        tracing::info!(
            listen_addr = %self.config.listen_addr,
            backend = self.backend.name(),
            cooldown = %self.gate.limiter().cooldown().describe(),
            count_verifications = self.config.count_verifications,
            "relay gate starting"
        );

        let server = self.server();
        let rx = self.shutdown.subscribe();
        if self.shutdown.is_triggered() {
            tracing::info!("shutdown requested before start, not serving");
            return Ok(());
        }
        self.shutdown.listen_for_signals();

        let result = server.start(rx).await;
        self.shutdown.stop_listening();
        result.map_err(NodeError::from)
    }

    /// Serve, then close the backend whether or not serving succeeded.
    pub async fn run(&self) -> Result<(), NodeError> {
        let served = self.start().await;
        if let Err(ref e) = served {
            tracing::error!(error = %e, "HTTP API failed");
        }
        let stopped = self.stop().await;
        served.and(stopped)
    }

    /// Close the backend. Idempotent.
    pub async fn stop(&self) -> Result<(), NodeError> {
        tracing::info!("relay gate stopping");
        self.shutdown.trigger();
        self.backend.close().await?;
        tracing::info!("backend closed");
        Ok(())
    }
}
