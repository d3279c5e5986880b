//! Axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use gate_verification::VerificationGate;

use crate::error::RpcError;
use crate::handlers;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub gate: Arc<VerificationGate>,
    /// `None` disables `/metrics`.
    pub registry: Option<Registry>,
}

impl ApiState {
    pub fn new(gate: Arc<VerificationGate>) -> Self {
        Self {
            gate,
            registry: None,
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }
}

pub struct RpcServer {
    pub addr: SocketAddr,
    state: ApiState,
    allowed_origins: Vec<String>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: ApiState, allowed_origins: Vec<String>) -> Self {
        Self {
            addr,
            state,
            allowed_origins,
        }
    }

    /// Build the router with CORS and request tracing applied.
    pub fn router(&self) -> Result<Router, RpcError> {
        Ok(Router::new()
            .route("/api/verify", post(handlers::verify))
            .route("/api/stats", get(handlers::stats))
            .route("/health", get(handlers::health))
            .route("/metrics", get(handlers::metrics))
            .layer(cors_layer(&self.allowed_origins)?)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone()))
    }

    /// Bind, then serve until `shutdown` fires.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let app = self.router()?;
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "HTTP API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP API draining connections");
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}

/// Empty list means any origin; the kiosk UI is usually served elsewhere.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, RpcError> {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| RpcError::InvalidOrigin {
                        origin: o.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use gate_ledger::VerificationLedger;
    use gate_nullables::{NullClock, NullStore, NullVerifier};
    use gate_verification::Cooldown;
    use prometheus::IntCounter;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server_with(store: Arc<NullStore>, verifier: NullVerifier) -> RpcServer {
        let gate = VerificationGate::new(
            VerificationLedger::new(store),
            Cooldown::from_secs(300),
            Arc::new(verifier),
            Arc::new(NullClock::new(1_700_000_000_000)),
        );
        let registry = Registry::new();
        let sample = IntCounter::new("gate_sample_total", "sample").unwrap();
        registry.register(Box::new(sample.clone())).unwrap();
        sample.inc();
        RpcServer::new(
            "127.0.0.1:0".parse().unwrap(),
            ApiState::new(Arc::new(gate)).with_registry(registry),
            Vec::new(),
        )
    }

    fn verify_request(nullifier: &str) -> Request<Body> {
        let body = json!({
            "proof": {
                "nullifier_hash": nullifier,
                "merkle_root": "0x01",
                "proof": "0x02",
                "verification_level": "orb"
            }
        });
        Request::post("/api/verify")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn accepted_then_rate_limited() {
        let router = server_with(Arc::new(NullStore::new()), NullVerifier::accepting())
            .router()
            .unwrap();

        let (status, body) = send(&router, verify_request("0xabc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({ "success": true }));

        let (status, body) = send(&router, verify_request("0xabc")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let body = json_of(&body);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("rate_limited"));
        assert_eq!(
            body["detail"],
            json!("Verification is only allowed once every 5 minutes. Please wait 0:05:00")
        );
    }

    #[tokio::test]
    async fn rejected_proof_is_bad_request() {
        let router = server_with(
            Arc::new(NullStore::new()),
            NullVerifier::rejecting("invalid_proof", "bad proof"),
        )
        .router()
        .unwrap();
        let (status, body) = send(&router, verify_request("0xabc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = json_of(&body);
        assert_eq!(body["code"], json!("invalid_proof"));
        assert_eq!(body["detail"], json!("bad proof"));
        assert_eq!(body["attribute"], Value::Null);
    }

    #[tokio::test]
    async fn verifier_outage_is_bad_gateway() {
        let router = server_with(Arc::new(NullStore::new()), NullVerifier::unreachable())
            .router()
            .unwrap();
        let (status, _) = send(&router, verify_request("0xabc")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let router = server_with(Arc::new(NullStore::new()), NullVerifier::accepting())
            .router()
            .unwrap();
        let req = Request::post("/api/verify")
            .header("content-type", "application/json")
            .body(Body::from("{\"proof\": 1}"))
            .unwrap();
        let (status, body) = send(&router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["code"], json!("invalid_request"));
    }

    #[tokio::test]
    async fn stats_reports_global_count() {
        let router = server_with(Arc::new(NullStore::new()), NullVerifier::accepting())
            .router()
            .unwrap();
        send(&router, verify_request("0xa")).await;
        send(&router, verify_request("0xb")).await;

        let (status, body) = send(&router, Request::get("/api/stats").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!({ "verified_total": 2 }));
    }

    #[tokio::test]
    async fn stats_unavailable_when_backend_down() {
        let router = server_with(Arc::new(NullStore::unavailable()), NullVerifier::accepting())
            .router()
            .unwrap();
        let (status, _) = send(&router, Request::get("/api/stats").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_and_metrics() {
        let router = server_with(Arc::new(NullStore::new()), NullVerifier::accepting())
            .router()
            .unwrap();
        let (status, body) = send(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");

        let (status, body) = send(&router, Request::get("/metrics").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("gate_sample_total 1"));
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let err = cors_layer(&["bad\norigin".to_string()]).unwrap_err();
        assert!(matches!(err, RpcError::InvalidOrigin { .. }));
    }

    #[test]
    fn explicit_origins_parse() {
        assert!(cors_layer(&["https://kiosk.example".to_string()]).is_ok());
    }
}
