//! rcon-proto エラー型

/// パケット解析のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// 型ごとに必要なオフセットまでバイトが届いていない
    TooShort {
        /// 必要なバイト数
        needed: usize,
        /// 実際に受信したバイト数
        actual: usize,
    },
    /// 先頭 2 バイトのプロトコルタグが "BE" ではない
    BadTag([u8; 2]),
    /// 未知のメッセージ型
    UnknownType(u8),
}

impl core::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtoError::TooShort { needed, actual } => {
                write!(f, "Packet too short: need {} bytes, got {}", needed, actual)
            }
            ProtoError::BadTag(tag) => {
                write!(f, "Invalid protocol tag: {:02x} {:02x}", tag[0], tag[1])
            }
            ProtoError::UnknownType(t) => write!(f, "Unknown packet type: 0x{:02x}", t),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtoError {}
