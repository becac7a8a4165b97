//! UDP ソケット
//!
//! 接続先を固定した (`connect` 済み) UDP ソケット。送受信は接続先とのみ行う。

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket};
use tracing::debug;

use crate::error::ClientError;

/// 1 データグラムの最大サイズ
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// 接続先に固定したデータグラムソケット
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpTransport {
    /// ホスト名を解決し、同じアドレスファミリのエフェメラルポートにバインドする
    ///
    /// # エラー
    /// - `ClientError::Resolve`: 解決結果が空
    /// - `ClientError::Transport`: 解決・バインド・connect の失敗
    pub async fn bind(host: &str, port: u16) -> Result<Self, ClientError> {
        let remote = lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| ClientError::Resolve(format!("{}:{}", host, port)))?;

        let local: SocketAddr = if remote.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(remote).await?;
        let local = socket.local_addr()?;
        debug!(%local, %remote, "udp socket bound");

        Ok(UdpTransport { socket, remote })
    }

    pub async fn send(&self, datagram: &[u8]) -> io::Result<()> {
        self.socket.send(datagram).await.map(|_| ())
    }

    pub async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket.recv(buf).await
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}
