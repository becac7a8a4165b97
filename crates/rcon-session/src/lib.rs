//! # rcon-session
//!
//! リモートコンソールセッションのコア状態機械。
//!
//! ソケットもタイマーも持たない sans-IO 実装。時刻は呼び出し側が
//! `now_ms` として注入し、送信すべきデータグラム・上位へのイベント・
//! 次に起こすべき時刻をキューから取り出してもらう。
//!
//! ## セッションの状態遷移
//!
//! ```text
//! Idle → Connecting (connect: ログインパケット送信)
//!      → Authenticated (ログイン応答 0x01)
//!      → Closed (close / 無応答タイムアウト)
//!
//! Connecting → Errored (ログイン拒否・不正応答) → Closed
//! ```
//!
//! ## タイマー
//!
//! - **キープアライブ**: 認証後、一定間隔で空コマンドを送る
//! - **生存確認**: 送信のたびに単発チェックを予約し、期限時点で
//!   最後の受信から閾値以上経っていればセッションを閉じる

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod event;
pub mod keepalive;
pub mod session;
pub mod state;

pub use config::{ConfigError, SessionConfig};
pub use event::{CloseReason, SessionError, SessionEvent};
pub use keepalive::KeepAliveScheduler;
pub use session::{Phase, RconSession};
pub use state::ConnectionState;

/// キープアライブ送信間隔（ミリ秒）
pub const DEFAULT_KEEPALIVE_INTERVAL_MS: u64 = 25_000;

/// 送信から生存確認までの遅延（ミリ秒）
pub const DEFAULT_TIMEOUT_CHECK_DELAY_MS: u64 = 3_000;

/// 最後の受信からこれ以上経過していたら切断とみなす（ミリ秒）
pub const DEFAULT_LIVENESS_TIMEOUT_MS: u64 = 5_000;
