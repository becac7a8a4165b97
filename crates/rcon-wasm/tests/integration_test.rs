//! rcon-wasm 統合テスト
//!
//! JS ホストと同じ手順（送信キューの排出・nextTimeout に従った tick・
//! pollEvents の JSON）でセッションを動かす。JS の型は使わない。

use rcon_proto::build_packet;
use rcon_session::{RconSession, SessionConfig};
use rcon_wasm::{drain_events, events_to_json, HostEvent};
use serde_json::Value;

// ==============================================================
// ヘルパー: JS ホストの模倣
// ==============================================================

struct Host {
    session: RconSession,
    sent: Vec<Vec<u8>>,
    now: u64,
}

impl Host {
    fn new(config: SessionConfig) -> Self {
        Host {
            session: RconSession::new("secret", config),
            sent: Vec::new(),
            now: 0,
        }
    }

    fn flush(&mut self) {
        while let Some(packet) = self.session.poll_transmit() {
            self.sent.push(packet);
        }
    }

    fn connect(&mut self) {
        self.session.connect(self.now);
        self.flush();
    }

    fn deliver(&mut self, payload: &[u8]) {
        self.session.recv_datagram(&build_packet(payload), self.now);
        self.flush();
    }

    /// setTimeout(nextTimeout - now) と同じく、次のタイマーまで時刻を進める
    fn advance_to_next_timeout(&mut self) -> bool {
        match self.session.poll_timeout() {
            Some(deadline) => {
                self.now = self.now.max(deadline);
                self.session.handle_timeout(self.now);
                self.flush();
                true
            }
            None => false,
        }
    }

    fn poll_events_json(&mut self) -> Value {
        let json = events_to_json(&drain_events(&mut self.session));
        serde_json::from_str(&json).unwrap()
    }

    /// 送信済みパケットのうちヘッダー以降（種別バイトから）
    fn sent_payloads(&mut self) -> Vec<Vec<u8>> {
        self.sent.drain(..).map(|p| p[7..].to_vec()).collect()
    }
}

// ==============================================================
// テスト
// ==============================================================

#[test]
fn test_host_login_and_command_round() {
    let mut host = Host::new(SessionConfig::default());
    host.connect();
    assert_eq!(host.sent_payloads(), vec![b"\x00secret".to_vec()]);

    host.now = 30;
    host.deliver(&[0x00, 0x01]);
    let events = host.poll_events_json();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["type"], "ready");

    host.now = 100;
    host.session.send_command("players", host.now);
    host.flush();
    assert_eq!(host.sent_payloads(), vec![b"\x01\x00players".to_vec()]);

    host.now = 140;
    host.deliver(b"\x01\x00\x00\x02\x01b");
    assert_eq!(host.poll_events_json(), Value::Array(vec![]));
    host.deliver(b"\x01\x00\x00\x02\x00a");
    let events = host.poll_events_json();
    assert_eq!(events[0]["type"], "message");
    assert_eq!(events[0]["text"], "ab");
}

#[test]
fn test_host_acks_server_messages() {
    let mut host = Host::new(SessionConfig::default());
    host.connect();
    host.deliver(&[0x00, 0x01]);
    host.sent_payloads();
    host.poll_events_json();

    host.deliver(b"\x02\x09Player joined");
    assert_eq!(host.sent_payloads(), vec![b"\x02\x09".to_vec()]);
    let events = host.poll_events_json();
    assert_eq!(events[0]["text"], "Player joined");
}

#[test]
fn test_host_timer_loop_sends_keepalive_then_times_out() {
    let config = SessionConfig {
        keepalive_interval_ms: 1_000,
        timeout_check_delay_ms: 300,
        liveness_timeout_ms: 500,
    };
    let mut host = Host::new(config);
    host.connect();
    host.deliver(&[0x00, 0x01]);
    host.sent_payloads();
    host.poll_events_json();

    // サーバーは以後何も返さない。タイマーに従って進めるだけで閉じるはず
    let mut keepalives = 0;
    let mut rounds = 0;
    while host.advance_to_next_timeout() {
        keepalives += host
            .sent_payloads()
            .iter()
            .filter(|p| p.as_slice() == b"\x01\x00\x00")
            .count();
        rounds += 1;
        assert!(rounds < 100, "タイマーが収束しない");
    }

    assert!(keepalives >= 1);
    assert!(host.session.is_closed());
    let events = host.poll_events_json();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "close");
    assert_eq!(events[0]["reason"], "liveness_timeout");
}

#[test]
fn test_host_login_rejected_events() {
    let mut host = Host::new(SessionConfig::default());
    host.connect();
    host.deliver(&[0x00, 0x00]);

    let events = drain_events(&mut host.session);
    assert!(matches!(events[0], HostEvent::Error { .. }));
    assert_eq!(events[1], HostEvent::Close { reason: "login_failed" });
    assert!(host.session.poll_timeout().is_none());
}

#[test]
fn test_host_close_is_reported_once() {
    let mut host = Host::new(SessionConfig::default());
    host.connect();
    host.deliver(&[0x00, 0x01]);
    host.poll_events_json();

    host.session.close();
    host.session.close();
    let events = host.poll_events_json();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["reason"], "requested");

    host.deliver(b"\x02\x01late");
    assert!(host.sent_payloads().is_empty());
    assert_eq!(host.poll_events_json(), Value::Array(vec![]));
}
