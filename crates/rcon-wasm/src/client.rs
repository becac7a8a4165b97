//! RconClient wasm-bindgen エクスポート
//!
//! JavaScript ホストから呼び出すリモートコンソールクライアントの主エントリポイント。
//! ホストはデータグラムの送受信とタイマーを担当し、このクラスは
//! `RconSession` を駆動して送信すべきパケットとイベントを返す。

extern crate alloc;

use alloc::format;
use alloc::string::String;

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use rcon_session::{Phase, RconSession, SessionConfig};

use crate::event::{drain_events, events_to_json};

/// リモートコンソールクライアントセッション
///
/// ## 内部アーキテクチャ
///
/// ```text
/// RconClient
///   └── RconSession (rcon-session) - ログイン・ACK・キープアライブ・生存確認
///         ├── PacketView        (rcon-proto) - パケット解析
///         └── FragmentReassembler (rcon-transport) - 分割応答の再組み立て
/// ```
///
/// WASM はシングルスレッドのため、JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct RconClient {
    session: RconSession,
}

#[wasm_bindgen]
impl RconClient {
    /// クライアントを初期化する
    ///
    /// # 引数
    /// - `password`: RCon パスワード
    /// - `keepalive_ms`: キープアライブ間隔。省略時は 25000
    /// - `liveness_timeout_ms`: 無応答とみなす閾値。省略時は 5000
    ///
    /// # エラー
    /// - タイミング設定の組み合わせが不正
    #[wasm_bindgen(constructor)]
    pub fn new(
        password: &str,
        keepalive_ms: Option<u32>,
        liveness_timeout_ms: Option<u32>,
    ) -> Result<RconClient, JsError> {
        let mut config = SessionConfig::default();
        if let Some(ms) = keepalive_ms {
            config.keepalive_interval_ms = u64::from(ms);
        }
        if let Some(ms) = liveness_timeout_ms {
            config.liveness_timeout_ms = u64::from(ms);
        }
        config
            .validate()
            .map_err(|e| JsError::new(&format!("Invalid configuration: {}", e)))?;

        Ok(RconClient {
            session: RconSession::new(password, config),
        })
    }

    /// ログインを開始する
    ///
    /// # 戻り値
    /// 送信すべきパケットの配列（ログインパケット 1 つ）
    #[wasm_bindgen]
    pub fn connect(&mut self, now_ms: f64) -> Array {
        self.session.connect(now_ms as u64);
        self.drain_transmits()
    }

    /// 受信したデータグラムを処理する
    ///
    /// 不正なパケットはエラーイベントになるだけで例外は投げない。
    ///
    /// # 戻り値
    /// 送信すべきパケットの配列（サーバーメッセージへの ACK など）
    #[wasm_bindgen(js_name = "recvPacket")]
    pub fn recv_packet(&mut self, bytes: &[u8], now_ms: f64) -> Array {
        self.session.recv_datagram(bytes, now_ms as u64);
        self.drain_transmits()
    }

    /// コマンドを送る
    ///
    /// 認証前・終了後は何も返さない。
    #[wasm_bindgen(js_name = "sendCommand")]
    pub fn send_command(&mut self, command: &str, now_ms: f64) -> Array {
        self.session.send_command(command, now_ms as u64);
        self.drain_transmits()
    }

    /// タイマー処理（キープアライブ送信・生存確認）
    ///
    /// `nextTimeout()` の時刻以降に呼び出す。早く呼んでも害はない。
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> Array {
        self.session.handle_timeout(now_ms as u64);
        self.drain_transmits()
    }

    /// セッションを閉じる。close イベントは一度だけ出る
    #[wasm_bindgen]
    pub fn close(&mut self) {
        self.session.close();
    }

    /// 溜まったイベントを JSON 配列の文字列で返す
    ///
    /// ```json
    /// [{"type":"ready"},{"type":"message","text":"..."},{"type":"close","reason":"requested"}]
    /// ```
    #[wasm_bindgen(js_name = "pollEvents")]
    pub fn poll_events(&mut self) -> String {
        events_to_json(&drain_events(&mut self.session))
    }

    /// 次に `tick` を呼ぶべき時刻（ミリ秒）。タイマーが無ければ undefined
    #[wasm_bindgen(js_name = "nextTimeout")]
    pub fn next_timeout(&self) -> Option<f64> {
        self.session.poll_timeout().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = "isClosed")]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    #[wasm_bindgen(js_name = "isAuthenticated")]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// 現在のフェーズ名（"idle" / "connecting" / "authenticated" / "errored" / "closed"）
    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        let name = match self.session.phase() {
            Phase::Idle => "idle",
            Phase::Connecting => "connecting",
            Phase::Authenticated => "authenticated",
            Phase::Errored => "errored",
            Phase::Closed => "closed",
        };
        String::from(name)
    }
}

impl RconClient {
    /// 送信キューを JS の Uint8Array 配列に移す
    fn drain_transmits(&mut self) -> Array {
        let result = Array::new();
        while let Some(packet) = self.session.poll_transmit() {
            let arr = Uint8Array::new_with_length(packet.len() as u32);
            arr.copy_from(&packet);
            result.push(&arr);
        }
        result
    }
}
