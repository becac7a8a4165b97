//! # rcon-wasm
//!
//! wasm-bindgen エクスポート：JavaScript ホスト（Node.js / ブラウザ拡張）から
//! 呼び出す公開 API。ソケットとタイマーはホスト側が持つ。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { RconClient, init_panic_hook } from '../rcon-wasm-pkg/rcon_wasm';
//!
//! init_panic_hook();
//!
//! const client = new RconClient("password");
//! const sendAll = (packets: Uint8Array[]) => {
//!     for (const pkt of packets) socket.send(Buffer.from(pkt), port, host);
//! };
//!
//! sendAll(client.connect(Date.now()));
//! socket.on('message', (msg) => sendAll(client.recvPacket(msg, Date.now())));
//!
//! // poll_timeout の時刻に合わせて起こす
//! const deadline = client.nextTimeout();
//! if (deadline !== undefined) {
//!     setTimeout(() => sendAll(client.tick(Date.now())), deadline - Date.now());
//! }
//!
//! for (const ev of JSON.parse(client.pollEvents())) {
//!     if (ev.type === 'message') console.log(ev.text);
//! }
//! ```

use wasm_bindgen::prelude::*;

pub mod client;
pub mod event;

pub use client::RconClient;
pub use event::{drain_events, events_to_json, HostEvent};

/// パニック時にコンソールにスタックトレースを出力する
///
/// 開発時に呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// 任意のバイト列をこのプロトコルのパケットに包む（テスト・デバッグ用）
#[wasm_bindgen(js_name = "buildPacket")]
pub fn build_packet(payload: &[u8]) -> js_sys::Uint8Array {
    let packet = rcon_proto::build_packet(payload);
    let arr = js_sys::Uint8Array::new_with_length(packet.len() as u32);
    arr.copy_from(&packet);
    arr
}
