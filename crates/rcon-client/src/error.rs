//! rcon-client エラー型

use std::io;

use rcon_session::{ConfigError, SessionError};
use thiserror::Error;

/// クライアントのエラー
///
/// `connect` の戻り値と、`EventSink::on_error` に渡す値の両方に使う。
#[derive(Debug, Error)]
pub enum ClientError {
    /// プロトコル上のエラー（ログイン失敗・不正パケット）
    #[error(transparent)]
    Session(#[from] SessionError),

    /// ソケットのエラー。UDP では一時的なものとして扱い、セッションは閉じない
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// ホスト名の解決結果が空
    #[error("could not resolve remote host {0}")]
    Resolve(String),

    /// 同じクライアントで二度 connect した
    #[error("client is already connected")]
    AlreadyConnected,
}
