//! 上位レイヤーへ渡すイベント

use alloc::string::String;

use rcon_proto::ProtoError;

/// セッションから上位レイヤーへ通知するイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// ログイン成功
    Ready,
    /// サーバーからのメッセージ（断片は連結済み）
    Message(String),
    /// プロトコルエラー
    Error(SessionError),
    /// セッション終了。セッションごとに一度だけ
    Close(CloseReason),
}

/// イベントとして報告されるエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// ログイン応答が 0x00（パスワード不一致）
    AuthenticationRejected,
    /// ログイン応答が 0x00 / 0x01 以外
    UnrecognizedLoginResponse(u8),
    /// 受信パケットが解析できない
    Malformed(ProtoError),
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::AuthenticationRejected => write!(f, "Login failed: authentication rejected"),
            SessionError::UnrecognizedLoginResponse(b) => {
                write!(f, "Login failed: unrecognized response 0x{:02x}", b)
            }
            SessionError::Malformed(e) => write!(f, "Malformed packet: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// セッションが閉じた理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// 呼び出し側の `close()`
    Requested,
    /// ログイン失敗（拒否・不正応答）
    LoginFailed,
    /// 無応答による切断検出
    LivenessTimeout,
}

impl core::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CloseReason::Requested => write!(f, "closed by client"),
            CloseReason::LoginFailed => write!(f, "login failed"),
            CloseReason::LivenessTimeout => write!(f, "no response from server"),
        }
    }
}
