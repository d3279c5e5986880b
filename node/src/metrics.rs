//! Prometheus metrics for the relay gate.
//!
//! [`GateMetrics`] owns a dedicated [`Registry`] that the HTTP `/metrics`
//! endpoint encodes into the Prometheus text exposition format, and
//! implements [`GateObserver`] so the gate can report without knowing
//! about Prometheus.

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

use gate_verification::GateObserver;

pub struct GateMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Proof submissions received.
    pub requests: IntCounter,
    /// Submissions refused by the cooldown.
    pub denied: IntCounter,
    /// Proofs accepted by the verifier.
    pub accepted: IntCounter,
    /// Proofs rejected by the verifier or malformed.
    pub rejected: IntCounter,
    /// Verifier calls that failed in transport.
    pub verifier_failures: IntCounter,
    /// Ledger reads that failed; each one admitted a request unchecked.
    pub backend_read_failures: IntCounter,
    /// Ledger writes that failed after an accepted proof.
    pub backend_write_failures: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
}

impl GateMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        Ok(Self {
            requests: counter(&registry, "gate_requests_total", "Proof submissions received")?,
            denied: counter(&registry, "gate_denied_total", "Submissions denied by the cooldown")?,
            accepted: counter(&registry, "gate_accepted_total", "Proofs accepted")?,
            rejected: counter(&registry, "gate_rejected_total", "Proofs rejected")?,
            verifier_failures: counter(
                &registry,
                "gate_verifier_failures_total",
                "Proof verifier transport failures",
            )?,
            backend_read_failures: counter(
                &registry,
                "gate_backend_read_failures_total",
                "Ledger reads that failed and admitted a request without a cooldown check",
            )?,
            backend_write_failures: counter(
                &registry,
                "gate_backend_write_failures_total",
                "Ledger writes that failed after an accepted proof",
            )?,
            registry,
        })
    }
}

impl GateObserver for GateMetrics {
    fn request(&self) {
        self.requests.inc();
    }
    fn denied(&self) {
        self.denied.inc();
    }
    fn accepted(&self) {
        self.accepted.inc();
    }
    fn rejected(&self) {
        self.rejected.inc();
    }
    fn verifier_failed(&self) {
        self.verifier_failures.inc();
    }
    fn backend_read_failed(&self) {
        self.backend_read_failures.inc();
    }
    fn backend_write_failed(&self) {
        self.backend_write_failures.inc();
    }
}
