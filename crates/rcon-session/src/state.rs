//! セッションの可変状態

use rcon_transport::FragmentReassembler;

/// 一つのセッションの状態
///
/// `RconSession` だけが書き換える。外部には読み取り専用で公開する。
#[derive(Debug, Default)]
pub struct ConnectionState {
    /// 最後に ACK したサーバーのシーケンス番号（mod 256、クライアントは進めない）
    pub(crate) sequence_number: u8,
    /// ログイン成功後 true、close で false
    pub(crate) authenticated: bool,
    /// 一度 true になったら戻らない。以降の送信はすべて抑止
    pub(crate) terminal_error: bool,
    /// 最後にデータグラムを受信した時刻
    pub(crate) last_inbound_at: Option<u64>,
    /// 最後にデータグラムを送信した時刻
    pub(crate) last_outbound_at: Option<u64>,
    /// 組み立て中の断片
    pub(crate) fragments: FragmentReassembler,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn terminal_error(&self) -> bool {
        self.terminal_error
    }

    pub fn last_inbound_at(&self) -> Option<u64> {
        self.last_inbound_at
    }

    pub fn last_outbound_at(&self) -> Option<u64> {
        self.last_outbound_at
    }

    /// 断片を組み立て中か
    pub fn has_pending_fragments(&self) -> bool {
        self.fragments.is_assembling()
    }

    /// 送信してよい状態か（ACK も含む）
    pub(crate) fn can_send(&self) -> bool {
        !self.terminal_error
    }

    /// コマンド・キープアライブを送ってよい状態か
    pub(crate) fn can_send_command(&self) -> bool {
        self.authenticated && !self.terminal_error
    }
}
