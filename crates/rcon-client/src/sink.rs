//! イベントの受け渡し先

use rcon_session::CloseReason;
use tokio::sync::mpsc;

use crate::error::ClientError;

/// セッションのイベントを受け取る側
///
/// ドライバタスクから直接呼ばれる。ブロックする処理は書かないこと。
pub trait EventSink: Send + 'static {
    /// ログイン成功
    fn on_ready(&mut self) {}

    /// サーバーからのメッセージ（断片は連結済み）
    fn on_message(&mut self, message: &str);

    /// エラー。セッションが続くかどうかは後続の `on_close` で判断する
    fn on_error(&mut self, _error: &ClientError) {}

    /// セッション終了。一度だけ呼ばれる
    fn on_close(&mut self, _reason: CloseReason) {}
}

/// チャンネルに流すイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Ready,
    Message(String),
    Error(String),
    Close(CloseReason),
}

/// イベントを mpsc チャンネルへ転送する `EventSink`
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ChannelSink {
    /// Sink と受信側のペアを作る
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelSink { tx }, rx)
    }

    fn forward(&self, event: ClientEvent) {
        // 受信側が先に落ちていても送信側は気にしない
        let _ = self.tx.send(event);
    }
}

impl EventSink for ChannelSink {
    fn on_ready(&mut self) {
        self.forward(ClientEvent::Ready);
    }

    fn on_message(&mut self, message: &str) {
        self.forward(ClientEvent::Message(message.to_owned()));
    }

    fn on_error(&mut self, error: &ClientError) {
        self.forward(ClientEvent::Error(error.to_string()));
    }

    fn on_close(&mut self, reason: CloseReason) {
        self.forward(ClientEvent::Close(reason));
    }
}
