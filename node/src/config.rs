//! Gate configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use gate_utils::LogFormat;
use gate_verification::{Cooldown, VerifierConfig};

use crate::NodeError;

/// Configuration for a relay gate.
///
/// Can be loaded from a TOML file via [`GateConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Minimum time between two accepted verifications of one user.
    /// Zero disables the cooldown.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Whether accepted verifications increment the global counter.
    #[serde(default = "default_true")]
    pub count_verifications: bool,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Origins allowed to call the API from a browser. Empty allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Where verification records live.
    #[serde(default)]
    pub backend: BackendConfig,

    /// World ID cloud verification settings.
    #[serde(default)]
    pub verifier: VerifierSettings,
}

/// Storage backend selection, chosen once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Local LMDB environment directory.
    Lmdb {
        #[serde(default = "default_data_dir")]
        path: PathBuf,
        #[serde(default = "default_map_size_mb")]
        map_size_mb: usize,
    },
    /// Process memory; records are lost on restart.
    Memory,
    /// Managed Redis reached over its REST command endpoint.
    Rest {
        url: String,
        token: String,
        #[serde(default = "default_rest_timeout_secs")]
        request_timeout_secs: u64,
    },
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Lmdb { .. } => "lmdb",
            BackendConfig::Memory => "memory",
            BackendConfig::Rest { .. } => "rest",
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Lmdb {
            path: default_data_dir(),
            map_size_mb: default_map_size_mb(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierSettings {
    /// Developer portal app id, `app_...`.
    #[serde(default)]
    pub app_id: String,
    /// Incognito action the proofs were generated for.
    #[serde(default)]
    pub action: String,
    #[serde(default = "default_verifier_base_url")]
    pub base_url: String,
    #[serde(default = "default_verifier_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_verifier_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            action: String::new(),
            base_url: default_verifier_base_url(),
            request_timeout_secs: default_verifier_request_timeout_secs(),
            connect_timeout_secs: default_verifier_connect_timeout_secs(),
        }
    }
}

impl VerifierSettings {
    pub fn to_verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..VerifierConfig::new(self.app_id.clone(), self.action.clone())
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7080))
}

fn default_cooldown_secs() -> u64 {
    Cooldown::DAILY.window().as_secs()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

pub const DEFAULT_DATA_DIR: &str = "./relay_gate_data";
pub const DEFAULT_MAP_SIZE_MB: usize = 64;

pub fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_map_size_mb() -> usize {
    DEFAULT_MAP_SIZE_MB
}

fn default_rest_timeout_secs() -> u64 {
    5
}

fn default_verifier_base_url() -> String {
    gate_verification::world_id::DEFAULT_BASE_URL.to_string()
}

fn default_verifier_request_timeout_secs() -> u64 {
    10
}

fn default_verifier_connect_timeout_secs() -> u64 {
    5
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GateConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn cooldown(&self) -> Cooldown {
        Cooldown::from_secs(self.cooldown_secs)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cooldown_secs: default_cooldown_secs(),
            count_verifications: true,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            allowed_origins: Vec::new(),
            backend: BackendConfig::default(),
            verifier: VerifierSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = GateConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = GateConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.listen_addr, config.listen_addr);
        assert_eq!(parsed.cooldown_secs, config.cooldown_secs);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.verifier, config.verifier);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = GateConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.listen_addr.port(), 7080);
        assert_eq!(config.cooldown_secs, 86_400);
        assert!(config.count_verifications);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(
            config.backend,
            BackendConfig::Lmdb {
                path: PathBuf::from("./relay_gate_data"),
                map_size_mb: 64
            }
        );
        assert_eq!(config.verifier.base_url, "https://developer.worldcoin.org");
        assert_eq!(config.verifier.request_timeout_secs, 10);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            listen_addr = "127.0.0.1:9000"
            cooldown_secs = 300
            count_verifications = false
            log_format = "json"
            allowed_origins = ["https://kiosk.example"]

            [backend]
            kind = "rest"
            url = "https://eu1-relay.upstash.io"
            token = "secret"

            [verifier]
            app_id = "app_staging_123"
            action = "relay-access"
        "#;
        let config = GateConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.cooldown().window(), Duration::from_secs(300));
        assert!(!config.count_verifications);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.allowed_origins, vec!["https://kiosk.example"]);
        assert_eq!(
            config.backend,
            BackendConfig::Rest {
                url: "https://eu1-relay.upstash.io".to_string(),
                token: "secret".to_string(),
                request_timeout_secs: 5,
            }
        );
        assert_eq!(config.verifier.app_id, "app_staging_123");
        assert_eq!(config.verifier.connect_timeout_secs, 5);
    }

    #[test]
    fn memory_backend_needs_no_fields() {
        let config = GateConfig::from_toml_str("[backend]\nkind = \"memory\"\n").unwrap();
        assert_eq!(config.backend, BackendConfig::Memory);
        assert_eq!(config.backend.kind(), "memory");
    }

    #[test]
    fn unknown_backend_kind_is_config_error() {
        let err = GateConfig::from_toml_str("[backend]\nkind = \"etcd\"\n").unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn verifier_settings_map_to_client_config() {
        let settings = VerifierSettings {
            app_id: "app_1".to_string(),
            action: "enter".to_string(),
            request_timeout_secs: 3,
            ..VerifierSettings::default()
        };
        let config = settings.to_verifier_config();
        assert_eq!(config.app_id, "app_1");
        assert_eq!(config.action, "enter");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = GateConfig::from_toml_file("/nonexistent/relay-gate.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
