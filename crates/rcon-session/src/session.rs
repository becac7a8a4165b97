//! リモートコンソールセッション状態機械
//!
//! ログイン、コマンド送信、サーバーメッセージへの ACK、断片の再組み立て、
//! キープアライブと無応答検出を担当する。
//! 実際のソケット送受信とタイマーの起床は呼び出し側（`rcon-client` / `rcon-wasm`）が行う。

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, info, trace, warn};
use rcon_proto::{
    ack_payload, build_packet, command_payload, keepalive_payload, login_payload, LoginResult,
    Packet, PacketView, ProtoError,
};

use crate::config::SessionConfig;
use crate::event::{CloseReason, SessionError, SessionEvent};
use crate::keepalive::KeepAliveScheduler;
use crate::state::ConnectionState;

/// セッションの段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 生成直後。`connect` 待ち
    Idle,
    /// ログインパケット送信済み、応答待ち
    Connecting,
    /// ログイン成功
    Authenticated,
    /// ログイン失敗。直後に Closed へ移る
    Errored,
    /// 終了。再利用不可
    Closed,
}

/// リモートコンソールセッション
///
/// 一つのクライアントにつき一つ。入力（受信データグラム・コマンド・時刻）を受け、
/// 出力（送信データグラム・イベント）をキューに積む。
///
/// ## 呼び出し側のループ
///
/// ```text
/// loop {
///     while let Some(pkt) = session.poll_transmit() { socket.send(pkt) }
///     while let Some(ev) = session.poll_event() { sink.dispatch(ev) }
///     if session.is_closed() { break }
///     select! {
///         datagram   => session.recv_datagram(bytes, now),
///         command    => session.send_command(text, now),
///         poll_timeout() 到達 => session.handle_timeout(now),
///     }
/// }
/// ```
pub struct RconSession {
    /// ログインパスワード（生成後は不変）
    secret: String,
    phase: Phase,
    state: ConnectionState,
    scheduler: KeepAliveScheduler,
    /// 送信待ちデータグラム
    transmits: VecDeque<Vec<u8>>,
    /// 未配送のイベント
    events: VecDeque<SessionEvent>,
}

impl RconSession {
    /// 新しいセッションを生成する（まだ何も送らない）
    pub fn new(secret: impl Into<String>, config: SessionConfig) -> Self {
        RconSession {
            secret: secret.into(),
            phase: Phase::Idle,
            state: ConnectionState::new(),
            scheduler: KeepAliveScheduler::new(&config),
            transmits: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    /// ログインパケットを送信し、タイマーを開始する
    ///
    /// 二度目以降の呼び出しは無視する。
    pub fn connect(&mut self, now_ms: u64) {
        if self.phase != Phase::Idle {
            warn!("connect called in phase {:?}; ignoring", self.phase);
            return;
        }

        self.phase = Phase::Connecting;
        self.scheduler.start(now_ms);

        let payload = login_payload(&self.secret);
        if self.transmit(&payload, now_ms) {
            self.scheduler.arm_check(now_ms);
        }
        debug!("login sent");
    }

    /// コマンドを送信する
    ///
    /// 未認証・エラー後・終了後は黙って捨てる（到達保証のない送りっぱなし）。
    pub fn send_command(&mut self, command: &str, now_ms: u64) {
        if self.phase != Phase::Authenticated || !self.state.can_send_command() {
            debug!("dropping command in phase {:?}", self.phase);
            return;
        }

        let payload = command_payload(command);
        if self.transmit(&payload, now_ms) {
            self.scheduler.arm_check(now_ms);
        }
    }

    /// 受信したデータグラムを処理する
    pub fn recv_datagram(&mut self, bytes: &[u8], now_ms: u64) {
        if !self.is_open() {
            trace!("datagram received in phase {:?}; ignoring", self.phase);
            return;
        }

        // 解析できないパケットでも相手が生きている証拠にはなる
        self.state.last_inbound_at = Some(now_ms);

        let view = match PacketView::new(bytes) {
            Ok(view) => view,
            Err(e) => return self.on_malformed(e),
        };

        if !view.checksum_matches() {
            debug!("checksum mismatch on inbound packet type 0x{:02x}", view.raw_type());
        }

        match view.decode() {
            Ok(packet) => self.on_packet(packet, now_ms),
            Err(e) => self.on_malformed(e),
        }
    }

    /// タイマー期限を処理する
    ///
    /// `poll_timeout()` の時刻以降に呼ぶ。早めに呼んでも害はない。
    pub fn handle_timeout(&mut self, now_ms: u64) {
        if !self.is_open() {
            return;
        }

        let expired = self.scheduler.take_expired_checks(now_ms);
        if expired > 0 && self.scheduler.is_silent(now_ms, self.state.last_inbound_at) {
            warn!(
                "no datagram from server since {:?} (now {}); closing",
                self.state.last_inbound_at, now_ms
            );
            self.close_with(CloseReason::LivenessTimeout);
            return;
        }

        if self.scheduler.keepalive_due(now_ms) {
            self.send_keepalive(now_ms);
        }
    }

    /// セッションを閉じる
    ///
    /// タイマーを止め、送信キューを破棄し、Close イベントを一度だけ積む。
    /// 既に閉じていれば何もしない。
    pub fn close(&mut self) {
        self.close_with(CloseReason::Requested);
    }

    /// 次に送信すべきデータグラム
    pub fn poll_transmit(&mut self) -> Option<Vec<u8>> {
        self.transmits.pop_front()
    }

    /// 次に上位へ渡すイベント
    pub fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }

    /// 次に `handle_timeout` を呼ぶべき時刻
    pub fn poll_timeout(&self) -> Option<u64> {
        if !self.is_open() {
            return None;
        }
        self.scheduler.next_deadline()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    // ===== Private メソッド =====

    fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Connecting | Phase::Authenticated)
    }

    /// ヘッダーを付けて送信キューに積む。抑止された場合は false
    fn transmit(&mut self, payload: &[u8], now_ms: u64) -> bool {
        if !self.is_open() || !self.state.can_send() {
            trace!("send suppressed in phase {:?}", self.phase);
            return false;
        }

        self.transmits.push_back(build_packet(payload));
        self.state.last_outbound_at = Some(now_ms);
        true
    }

    fn send_keepalive(&mut self, now_ms: u64) {
        if !self.state.can_send_command() {
            trace!("keep-alive skipped: not authenticated");
            return;
        }

        if self.transmit(&keepalive_payload(), now_ms) {
            self.scheduler.arm_check(now_ms);
            trace!("keep-alive sent");
        }
    }

    fn on_packet(&mut self, packet: Packet<'_>, now_ms: u64) {
        if let Packet::Login(result) = packet {
            return self.on_login(result);
        }

        if self.phase != Phase::Authenticated {
            debug!("discarding {:?} received before login", packet);
            return;
        }

        match packet {
            // ACK はイベントより先に積む。省略するとサーバーに切断される
            Packet::Message { sequence, text } | Packet::Command { sequence, text } => {
                self.acknowledge(sequence, now_ms);
                self.emit_message(text);
            }
            Packet::CommandAck { sequence } => {
                trace!("empty command response (seq {})", sequence);
                self.acknowledge(sequence, now_ms);
            }
            Packet::Fragment(fragment) => {
                if let Some(bytes) = self.state.fragments.add_fragment(fragment) {
                    self.emit_message(&bytes);
                }
            }
            Packet::Login(_) => {}
        }
    }

    fn acknowledge(&mut self, sequence: u8, now_ms: u64) {
        self.state.sequence_number = sequence;
        self.transmit(&ack_payload(sequence), now_ms);
    }

    fn on_login(&mut self, result: LoginResult) {
        if self.state.authenticated {
            debug!("ignoring repeated login response {:?}", result);
            return;
        }

        match result {
            LoginResult::Accepted => {
                self.state.authenticated = true;
                self.phase = Phase::Authenticated;
                info!("logged in");
                self.events.push_back(SessionEvent::Ready);
            }
            LoginResult::Rejected => self.fail(SessionError::AuthenticationRejected),
            LoginResult::Unrecognized(b) => self.fail(SessionError::UnrecognizedLoginResponse(b)),
        }
    }

    fn on_malformed(&mut self, error: ProtoError) {
        warn!("malformed packet: {}", error);
        if self.phase == Phase::Connecting {
            self.fail(SessionError::Malformed(error));
        } else {
            self.events
                .push_back(SessionEvent::Error(SessionError::Malformed(error)));
        }
    }

    /// ログイン段階の失敗: Errored → Closed
    fn fail(&mut self, error: SessionError) {
        warn!("{}", error);
        self.state.terminal_error = true;
        self.phase = Phase::Errored;
        self.events.push_back(SessionEvent::Error(error));
        self.close_with(CloseReason::LoginFailed);
    }

    fn close_with(&mut self, reason: CloseReason) {
        if self.phase == Phase::Closed {
            return;
        }

        self.scheduler.stop();
        self.state.fragments.reset();
        self.state.authenticated = false;
        self.transmits.clear();
        self.phase = Phase::Closed;
        info!("session closed: {}", reason);
        self.events.push_back(SessionEvent::Close(reason));
    }

    fn emit_message(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes).into_owned();
        self.events.push_back(SessionEvent::Message(text));
    }
}
