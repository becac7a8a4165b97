//! ホストへ渡すイベント
//!
//! `SessionEvent` を JSON にして JavaScript 側へ渡す。
//! `{"type":"ready"}` / `{"type":"message","text":..}` /
//! `{"type":"error","message":..}` / `{"type":"close","reason":..}`

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use rcon_session::{CloseReason, RconSession, SessionEvent};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostEvent {
    Ready,
    Message { text: String },
    Error { message: String },
    Close { reason: &'static str },
}

impl From<SessionEvent> for HostEvent {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Ready => HostEvent::Ready,
            SessionEvent::Message(text) => HostEvent::Message { text },
            SessionEvent::Error(e) => HostEvent::Error {
                message: e.to_string(),
            },
            SessionEvent::Close(reason) => HostEvent::Close {
                reason: close_reason_name(reason),
            },
        }
    }
}

fn close_reason_name(reason: CloseReason) -> &'static str {
    match reason {
        CloseReason::Requested => "requested",
        CloseReason::LoginFailed => "login_failed",
        CloseReason::LivenessTimeout => "liveness_timeout",
    }
}

/// セッションのイベントキューを空にする
pub fn drain_events(session: &mut RconSession) -> Vec<HostEvent> {
    let mut events = Vec::new();
    while let Some(event) = session.poll_event() {
        events.push(HostEvent::from(event));
    }
    events
}

/// イベント列を JSON 配列にする
pub fn events_to_json(events: &[HostEvent]) -> String {
    // 文字列とユニット以外を含まないので失敗しない
    serde_json::to_string(events).unwrap_or_else(|_| String::from("[]"))
}
