//! クライアント設定

use std::fmt;

use rcon_session::{
    ConfigError, SessionConfig, DEFAULT_KEEPALIVE_INTERVAL_MS, DEFAULT_LIVENESS_TIMEOUT_MS,
    DEFAULT_TIMEOUT_CHECK_DELAY_MS,
};
use serde::Deserialize;

/// 接続先とタイマーの設定
///
/// 接続先・パスワードは必須。タイマー値は省略時に既定値を使う。
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
    #[serde(default = "default_timeout_check_delay_ms")]
    pub timeout_check_delay_ms: u64,
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,
}

fn default_keepalive_interval_ms() -> u64 {
    DEFAULT_KEEPALIVE_INTERVAL_MS
}

fn default_timeout_check_delay_ms() -> u64 {
    DEFAULT_TIMEOUT_CHECK_DELAY_MS
}

fn default_liveness_timeout_ms() -> u64 {
    DEFAULT_LIVENESS_TIMEOUT_MS
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        ClientConfig {
            host: host.into(),
            port,
            password: password.into(),
            keepalive_interval_ms: DEFAULT_KEEPALIVE_INTERVAL_MS,
            timeout_check_delay_ms: DEFAULT_TIMEOUT_CHECK_DELAY_MS,
            liveness_timeout_ms: DEFAULT_LIVENESS_TIMEOUT_MS,
        }
    }

    /// セッションに渡すタイマー設定
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            keepalive_interval_ms: self.keepalive_interval_ms,
            timeout_check_delay_ms: self.timeout_check_delay_ms,
            liveness_timeout_ms: self.liveness_timeout_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session_config().validate()
    }
}

// パスワードはログに出さない
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("keepalive_interval_ms", &self.keepalive_interval_ms)
            .field("timeout_check_delay_ms", &self.timeout_check_delay_ms)
            .field("liveness_timeout_ms", &self.liveness_timeout_ms)
            .finish()
    }
}
