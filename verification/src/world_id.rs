//! HTTP client for the World ID cloud verification API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::{ProofPayload, ProofVerifier, VerifierError, VerifierVerdict};

/// Default timeout for verification requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Production endpoint of the Developer Portal.
pub const DEFAULT_BASE_URL: &str = "https://developer.worldcoin.org";

/// Settings for [`WorldIdVerifier`].
#[derive(Clone, Debug)]
pub struct VerifierConfig {
    /// Developer Portal app id, `app_...`.
    pub app_id: String,
    /// Incognito action the proofs were generated for.
    pub action: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl VerifierConfig {
    pub fn new(app_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            action: action.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Request body of `POST /api/v2/verify/{app_id}`.
#[derive(Debug, Serialize)]
struct VerifyBody<'a> {
    nullifier_hash: &'a str,
    merkle_root: &'a str,
    proof: &'a str,
    verification_level: &'a str,
    action: &'a str,
    signal_hash: String,
}

/// Error body returned with a 4xx status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    attribute: Option<String>,
}

/// Verifies proofs against the World ID cloud API.
pub struct WorldIdVerifier {
    config: VerifierConfig,
    http_client: reqwest::Client,
}

impl WorldIdVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        if !config.app_id.starts_with("app_") {
            return Err(VerifierError::Config(format!(
                "app id {:?} must start with app_",
                config.app_id
            )));
        }
        if config.action.is_empty() {
            return Err(VerifierError::Config("action must not be empty".to_string()));
        }
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| VerifierError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/api/v2/verify/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.app_id
        )
    }
}

#[async_trait]
impl ProofVerifier for WorldIdVerifier {
    fn name(&self) -> &str {
        "world-id-cloud"
    }

    async fn verify(
        &self,
        proof: &ProofPayload,
        signal: Option<&str>,
    ) -> Result<VerifierVerdict, VerifierError> {
        let body = VerifyBody {
            nullifier_hash: &proof.nullifier_hash,
            merkle_root: &proof.merkle_root,
            proof: &proof.proof,
            verification_level: proof.verification_level.as_str(),
            action: &self.config.action,
            signal_hash: hash_signal(signal.unwrap_or("")),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerifierError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    VerifierError::Unreachable(format!("connection failed: {e}"))
                } else {
                    VerifierError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(VerifierVerdict::Accepted);
        }
        if !status.is_client_error() {
            return Err(VerifierError::RequestFailed(format!("HTTP status {status}")));
        }

        let err: ErrorBody = response.json().await.map_err(|e| {
            VerifierError::InvalidResponse(format!("failed to parse rejection ({status}): {e}"))
        })?;
        Ok(VerifierVerdict::Rejected {
            code: err.code.unwrap_or_else(|| "unknown_error".to_string()),
            attribute: err.attribute,
            detail: err
                .detail
                .unwrap_or_else(|| format!("verification rejected with HTTP status {status}")),
        })
    }
}

/// Hash a signal the way World ID proofs commit to it: keccak256 shifted
/// right by one byte so the value fits the proof's field, `0x`-prefixed hex.
pub fn hash_signal(signal: &str) -> String {
    let digest = Keccak256::digest(signal.as_bytes());
    let mut field = [0u8; 32];
    field[1..].copy_from_slice(&digest[..31]);
    format!("0x{}", hex::encode(field))
}
