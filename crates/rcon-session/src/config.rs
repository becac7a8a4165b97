//! セッションのタイミング設定

use crate::{
    DEFAULT_KEEPALIVE_INTERVAL_MS, DEFAULT_LIVENESS_TIMEOUT_MS, DEFAULT_TIMEOUT_CHECK_DELAY_MS,
};

/// タイマー関連の調整値（すべてミリ秒）
///
/// プロトコル定数ではないので、サーバーの挙動に合わせて変えてよい。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// キープアライブの送信間隔
    pub keepalive_interval_ms: u64,
    /// 送信から生存確認を行うまでの遅延
    pub timeout_check_delay_ms: u64,
    /// 最後の受信からの無応答許容時間
    pub liveness_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            keepalive_interval_ms: DEFAULT_KEEPALIVE_INTERVAL_MS,
            timeout_check_delay_ms: DEFAULT_TIMEOUT_CHECK_DELAY_MS,
            liveness_timeout_ms: DEFAULT_LIVENESS_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// 設定値の整合性を確認する
    ///
    /// # エラー
    /// - `ConfigError::ZeroKeepAliveInterval`: 間隔 0
    /// - `ConfigError::LivenessBelowCheckDelay`: 無応答許容時間が確認遅延より短い
    ///   （最初の往復で誤って切断してしまう）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keepalive_interval_ms == 0 {
            return Err(ConfigError::ZeroKeepAliveInterval);
        }
        if self.liveness_timeout_ms < self.timeout_check_delay_ms {
            return Err(ConfigError::LivenessBelowCheckDelay {
                liveness_timeout_ms: self.liveness_timeout_ms,
                timeout_check_delay_ms: self.timeout_check_delay_ms,
            });
        }
        Ok(())
    }
}

/// 設定エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroKeepAliveInterval,
    LivenessBelowCheckDelay {
        liveness_timeout_ms: u64,
        timeout_check_delay_ms: u64,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroKeepAliveInterval => write!(f, "Keep-alive interval must be non-zero"),
            ConfigError::LivenessBelowCheckDelay {
                liveness_timeout_ms,
                timeout_check_delay_ms,
            } => write!(
                f,
                "Liveness timeout ({} ms) must not be shorter than the timeout check delay ({} ms)",
                liveness_timeout_ms, timeout_check_delay_ms
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
