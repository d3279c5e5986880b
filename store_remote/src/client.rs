//! HTTP client for the Redis REST command endpoint.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use gate_store::{KvBackend, StoreError};

use crate::RemoteError;

/// Default timeout for a single command.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection settings for the managed store.
#[derive(Clone, Debug)]
pub struct RestConfig {
    /// Base URL of the REST endpoint, e.g. `https://eu1-neat-fox-12345.upstash.io`.
    pub url: String,
    /// Bearer token with read/write access.
    pub token: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl RestConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            request_timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Raw reply envelope: exactly one of the two fields is present.
#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Key-value backend backed by a hosted Redis REST endpoint.
///
/// The HTTP client (and its connection pool) is built once in
/// [`RestKvStore::connect`] and reused until [`KvBackend::close`].
pub struct RestKvStore {
    url: String,
    token: String,
    http_client: RwLock<Option<reqwest::Client>>,
}

impl RestKvStore {
    /// Build the client and verify the endpoint answers `PING`.
    pub async fn connect(config: RestConfig) -> Result<Self, RemoteError> {
        if config.url.trim().is_empty() {
            return Err(RemoteError::Config("url must not be empty".to_string()));
        }
        if config.token.trim().is_empty() {
            return Err(RemoteError::Config("token must not be empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RemoteError::Config(format!("failed to build HTTP client: {e}")))?;

        let store = Self {
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token,
            http_client: RwLock::new(Some(http_client)),
        };

        let pong = store.command(&["PING"]).await?;
        if pong != Value::String("PONG".to_string()) {
            return Err(RemoteError::InvalidResponse(format!(
                "unexpected PING reply: {pong}"
            )));
        }
        tracing::info!(url = %store.url, "connected to REST key-value store");
        Ok(store)
    }

    fn client(&self) -> Result<reqwest::Client, StoreError> {
        let guard = self
            .http_client
            .read()
            .map_err(|_| StoreError::Backend("REST client lock poisoned".to_string()))?;
        guard.clone().ok_or(StoreError::Closed)
    }

    /// Send one command and return its `result` value.
    async fn command(&self, args: &[&str]) -> Result<Value, RemoteError> {
        let client = self
            .client()
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;
        send_command(&client, &self.url, &self.token, args).await
    }

    async fn run(&self, args: &[&str]) -> Result<Value, StoreError> {
        let client = self.client()?;
        send_command(&client, &self.url, &self.token, args)
            .await
            .map_err(StoreError::from)
    }
}

/// Perform a single command request.
async fn send_command(
    client: &reqwest::Client,
    url: &str,
    token: &str,
    args: &[&str],
) -> Result<Value, RemoteError> {
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(args)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RemoteError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                RemoteError::Unreachable(format!("connection failed: {e}"))
            } else {
                RemoteError::RequestFailed(e.to_string())
            }
        })?;

    let status = response.status();
    if status.is_server_error() {
        return Err(RemoteError::Unreachable(format!("HTTP status {status}")));
    }

    let reply: CommandReply = response.json().await.map_err(|e| {
        RemoteError::InvalidResponse(format!("failed to parse command reply ({status}): {e}"))
    })?;

    match (reply.error, reply.result) {
        (Some(err), _) => Err(RemoteError::Command(err)),
        (None, _) if !status.is_success() => {
            Err(RemoteError::RequestFailed(format!("HTTP status {status}")))
        }
        (None, result) => Ok(result.unwrap_or(Value::Null)),
    }
}

#[async_trait]
impl KvBackend for RestKvStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.run(&["GET", key]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(StoreError::Corruption {
                key: key.to_string(),
                reason: format!("unexpected GET reply: {other}"),
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self.run(&["SET", key, value]).await? {
            Value::String(ref s) if s == "OK" => Ok(()),
            other => Err(StoreError::Backend(format!("unexpected SET reply: {other}"))),
        }
    }

    async fn increment(&self, key: &str) -> Result<u64, StoreError> {
        let client = self.client()?;
        let reply = send_command(&client, &self.url, &self.token, &["INCR", key]).await;
        match reply {
            Ok(Value::Number(n)) => n.as_u64().ok_or_else(|| StoreError::Corruption {
                key: key.to_string(),
                reason: format!("INCR returned {n}"),
            }),
            Ok(other) => Err(StoreError::Backend(format!("unexpected INCR reply: {other}"))),
            Err(RemoteError::Command(msg)) if msg.contains("not an integer") => {
                Err(StoreError::Corruption {
                    key: key.to_string(),
                    reason: msg,
                })
            }
            Err(RemoteError::Command(msg)) if msg.contains("overflow") => {
                Err(StoreError::Overflow(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self) -> Result<(), StoreError> {
        let taken = self
            .http_client
            .write()
            .map_err(|_| StoreError::Backend("REST client lock poisoned".to_string()))?
            .take();
        if taken.is_some() {
            tracing::info!(url = %self.url, "closed REST key-value store client");
        }
        Ok(())
    }
}
