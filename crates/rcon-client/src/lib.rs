//! # rcon-client
//!
//! `rcon-session` を tokio の UDP ソケットとタイマーで動かすクライアント。
//!
//! ```text
//! RconClient
//!   └── driver task
//!         ├── UdpTransport  - 接続先固定の UDP ソケット
//!         ├── RconSession   (rcon-session) - 状態機械
//!         └── EventSink     - 上位へのイベント通知
//! ```
//!
//! ソケットのエラーは `on_error` に流すだけでセッションは閉じない。
//! サーバーの消失はセッションの無応答検出で扱う。

pub mod client;
pub mod config;
pub mod error;
pub mod sink;
pub mod transport;

pub use client::RconClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use rcon_session::CloseReason;
pub use sink::{ChannelSink, ClientEvent, EventSink};
pub use transport::UdpTransport;
