//! # rcon-proto
//!
//! UDP リモートコンソールプロトコルのパケットコーデック。
//!
//! 状態を持たない純粋関数のみ。ヘッダーの付与と CRC-32 計算、
//! 受信パケットの型別解析を担当する。
//!
//! ## パケット構造
//!
//! ```text
//! offset 0-1 : "BE"
//! offset 2-5 : CRC-32 (LE) over [0xFF][payload...]
//! offset 6   : 0xFF
//! offset 7   : type (0x00 login / 0x01 command / 0x02 message)
//! offset 8+  : 型ごとのフィールド
//! ```
//!
//! ## クライアント → サーバーのペイロード
//!
//! ```text
//! login     : [0x00][password...]
//! command   : [0x01][0x00][command...]
//! ack       : [0x02][sequence]
//! keepalive : [0x01][0x00][0x00]
//! ```

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod error;
pub mod packet;

pub use checksum::{checksum, packet_checksum};
pub use error::ProtoError;
pub use packet::{
    ack_payload, build_packet, command_payload, keepalive_payload, login_payload, parse,
    Fragment, LoginResult, Packet, PacketType, PacketView, HEADER_LEN, MARKER, PROTOCOL_TAG,
};
