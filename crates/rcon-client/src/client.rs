//! 非同期クライアント
//!
//! セッション・ソケット・タイマーを一つのタスクが所有し、受信・タイマー・
//! コマンド・close をすべて同じタスク上で順に処理する。ロックは不要。

use std::net::SocketAddr;
use std::time::Duration;

use rcon_session::{RconSession, SessionEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::sink::EventSink;
use crate::transport::{UdpTransport, MAX_DATAGRAM_SIZE};

/// ドライバタスクへの要求
#[derive(Debug)]
enum Request {
    Command(String),
    Close,
}

/// 起動中のドライバタスク
struct Driver {
    requests: mpsc::UnboundedSender<Request>,
    task: JoinHandle<()>,
}

/// リモートコンソールクライアント
///
/// 一つのクライアントで接続できるのは一度だけ。閉じた後に再接続したい場合は
/// 新しい `RconClient` を作る。
///
/// # 例
/// ```no_run
/// # async fn run() -> Result<(), rcon_client::ClientError> {
/// use rcon_client::{ChannelSink, ClientConfig, ClientEvent, RconClient};
///
/// let (sink, mut events) = ChannelSink::channel();
/// let mut client = RconClient::new(ClientConfig::new("127.0.0.1", 2306, "password"));
/// client.connect(sink).await?;
///
/// while let Some(event) = events.recv().await {
///     match event {
///         ClientEvent::Ready => client.send_command("players"),
///         ClientEvent::Message(text) => println!("{}", text),
///         ClientEvent::Close(_) => break,
///         ClientEvent::Error(e) => eprintln!("{}", e),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct RconClient {
    config: ClientConfig,
    driver: Option<Driver>,
}

impl RconClient {
    pub fn new(config: ClientConfig) -> Self {
        RconClient { config, driver: None }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// ソケットをバインドし、ログインを開始する
    ///
    /// ログイン結果は `sink` に `on_ready` / `on_error` + `on_close` として届く。
    ///
    /// # 戻り値
    /// バインドしたローカルアドレス
    pub async fn connect<S: EventSink>(&mut self, sink: S) -> Result<SocketAddr, ClientError> {
        if self.driver.is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        self.config.validate()?;

        let transport = UdpTransport::bind(&self.config.host, self.config.port).await?;
        let local = transport.local_addr()?;
        info!(remote = %transport.remote_addr(), %local, "connecting");

        let session = RconSession::new(self.config.password.clone(), self.config.session_config());
        let (requests, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(session, transport, rx, sink));

        self.driver = Some(Driver { requests, task });
        Ok(local)
    }

    /// コマンドを送る（送りっぱなし）
    ///
    /// 未接続・未認証・終了後は黙って捨てる。
    pub fn send_command(&self, command: &str) {
        match &self.driver {
            Some(driver) => {
                let _ = driver.requests.send(Request::Command(command.to_owned()));
            }
            None => debug!("not connected; dropping command"),
        }
    }

    /// セッションを閉じ、ドライバタスクの終了を待つ
    ///
    /// 既に閉じている場合は何もしない。
    pub async fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = driver.requests.send(Request::Close);
            if let Err(e) = driver.task.await {
                warn!(error = %e, "driver task failed");
            }
        }
    }

    /// セッションが終わるまで待つ（サーバー側の切断・タイムアウト・ログイン失敗）
    pub async fn closed(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            if let Err(e) = (&mut driver.task).await {
                warn!(error = %e, "driver task failed");
            }
            self.driver = None;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.driver
            .as_ref()
            .map_or(true, |driver| driver.task.is_finished())
    }
}

impl Drop for RconClient {
    fn drop(&mut self) {
        if let Some(driver) = &self.driver {
            let _ = driver.requests.send(Request::Close);
        }
    }
}

/// ドライバタスク本体
async fn drive<S: EventSink>(
    mut session: RconSession,
    transport: UdpTransport,
    mut requests: mpsc::UnboundedReceiver<Request>,
    mut sink: S,
) {
    let epoch = Instant::now();
    let now_ms = || epoch.elapsed().as_millis() as u64;
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let mut requests_open = true;

    session.connect(now_ms());

    loop {
        flush_transmits(&mut session, &transport, &mut sink).await;
        dispatch_events(&mut session, &mut sink);

        if session.is_closed() {
            break;
        }

        let deadline = session
            .poll_timeout()
            .map(|ms| epoch + Duration::from_millis(ms));

        tokio::select! {
            received = transport.recv(&mut buf) => match received {
                Ok(len) => session.recv_datagram(&buf[..len], now_ms()),
                Err(e) => {
                    // UDP のエラーは一時的なもの。無応答が続けばタイマーが閉じる
                    warn!(error = %e, "receive failed");
                    sink.on_error(&ClientError::Transport(e));
                }
            },
            request = requests.recv(), if requests_open => match request {
                Some(Request::Command(command)) => session.send_command(&command, now_ms()),
                Some(Request::Close) => session.close(),
                None => {
                    requests_open = false;
                    session.close();
                }
            },
            _ = sleep_until(deadline.unwrap_or(epoch)), if deadline.is_some() => {
                session.handle_timeout(now_ms());
            }
        }
    }

    debug!("driver finished; releasing socket");
}

async fn flush_transmits<S: EventSink>(
    session: &mut RconSession,
    transport: &UdpTransport,
    sink: &mut S,
) {
    while let Some(datagram) = session.poll_transmit() {
        if let Err(e) = transport.send(&datagram).await {
            warn!(error = %e, "send failed");
            sink.on_error(&ClientError::Transport(e));
        }
    }
}

fn dispatch_events<S: EventSink>(session: &mut RconSession, sink: &mut S) {
    while let Some(event) = session.poll_event() {
        match event {
            SessionEvent::Ready => sink.on_ready(),
            SessionEvent::Message(text) => sink.on_message(&text),
            SessionEvent::Error(e) => sink.on_error(&ClientError::Session(e)),
            SessionEvent::Close(reason) => sink.on_close(reason),
        }
    }
}
