//! コマンドラインクライアント
//!
//! 標準入力の各行をコマンドとして送り、サーバーからのメッセージを標準出力に書く。

use anyhow::Context;
use clap::Parser;
use rcon_client::{ChannelSink, ClientConfig, ClientEvent, RconClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rcon", about = "Remote console client over UDP")]
struct Opt {
    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Server RCon port
    #[arg(long, short)]
    port: u16,
    /// RCon password
    #[arg(long)]
    password: String,
    /// Seconds between keep-alive packets
    #[arg(long, default_value_t = 25)]
    keepalive_secs: u64,
    /// Seconds of silence after which the server is considered gone
    /// (must not be below --check-delay-secs)
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
    /// Seconds between a send and the liveness check it arms
    #[arg(long, default_value_t = 3)]
    check_delay_secs: u64,
}

fn client_config(opt: Opt) -> ClientConfig {
    let mut config = ClientConfig::new(opt.host, opt.port, opt.password);
    config.keepalive_interval_ms = opt.keepalive_secs.saturating_mul(1_000);
    config.timeout_check_delay_ms = opt.check_delay_secs.saturating_mul(1_000);
    config.liveness_timeout_ms = opt.timeout_secs.saturating_mul(1_000);
    config
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = client_config(Opt::parse());

    let (sink, mut events) = ChannelSink::channel();
    let mut client = RconClient::new(config);
    client.connect(sink).await.context("failed to connect")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::Ready) => eprintln!("Logged in."),
                Some(ClientEvent::Message(text)) => println!("{}", text),
                Some(ClientEvent::Error(e)) => eprintln!("error: {}", e),
                Some(ClientEvent::Close(reason)) => {
                    eprintln!("Connection closed ({}).", reason);
                    break;
                }
                None => break,
            },
            line = lines.next_line(), if stdin_open => {
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        let command = line.trim();
                        if !command.is_empty() {
                            client.send_command(command);
                        }
                    }
                    None => {
                        stdin_open = false;
                        client.close().await;
                    }
                }
            }
        }
    }

    client.close().await;
    Ok(())
}
