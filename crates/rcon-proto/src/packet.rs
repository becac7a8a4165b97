//! パケットの組み立てと解析
//!
//! ## Wire Format
//! ```text
//! [tag: "BE" (2 bytes)]
//! [checksum: u32 LE (4 bytes)]   ← marker + payload の CRC-32
//! [marker: 0xFF (1 byte)]
//! [payload: type (1 byte) + 型ごとのフィールド]
//! ```
//!
//! ## サーバー → クライアントの型別レイアウト（オフセットはパケット先頭から）
//! ```text
//! 0x00 login   : [8] 結果 (0x01 成功 / 0x00 拒否)
//! 0x01 command : [8] 予約 [9] 予約
//!                  両方 0 → [10] 総数 [11] 番号 [12..] 断片
//!                  それ以外 → [9..] テキスト
//!                  長さ 9 → テキストなしの応答
//! 0x02 message : [8] シーケンス番号 [9..] テキスト
//! ```

use alloc::vec::Vec;

use crate::checksum::packet_checksum;
use crate::error::ProtoError;

/// プロトコルタグ（ASCII "BE"）
pub const PROTOCOL_TAG: [u8; 2] = *b"BE";

/// ヘッダー末尾のマーカーバイト
pub const MARKER: u8 = 0xFF;

/// ヘッダー長（tag 2 + checksum 4 + marker 1）
pub const HEADER_LEN: usize = 7;

/// 各フィールドのオフセット
pub mod offset {
    pub const TAG: usize = 0;
    pub const CHECKSUM: usize = 2;
    pub const MARKER: usize = 6;
    pub const TYPE: usize = 7;
    pub const LOGIN_RESULT: usize = 8;
    pub const SEQUENCE: usize = 8;
    pub const MESSAGE_TEXT: usize = 9;
    pub const RESERVED_0: usize = 8;
    pub const RESERVED_1: usize = 9;
    pub const COMMAND_TEXT: usize = 9;
    pub const FRAGMENT_TOTAL: usize = 10;
    pub const FRAGMENT_INDEX: usize = 11;
    pub const FRAGMENT_PAYLOAD: usize = 12;
}

/// メッセージ型（オフセット 7 のバイト）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Login = 0x00,
    Command = 0x01,
    Message = 0x02,
}

impl TryFrom<u8> for PacketType {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(PacketType::Login),
            0x01 => Ok(PacketType::Command),
            0x02 => Ok(PacketType::Message),
            other => Err(ProtoError::UnknownType(other)),
        }
    }
}

/// ログイン応答の結果バイト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResult {
    /// 0x01
    Accepted,
    /// 0x00
    Rejected,
    /// それ以外（不正な応答）
    Unrecognized(u8),
}

impl From<u8> for LoginResult {
    fn from(value: u8) -> Self {
        match value {
            0x01 => LoginResult::Accepted,
            0x00 => LoginResult::Rejected,
            other => LoginResult::Unrecognized(other),
        }
    }
}

/// 複数データグラムに分割されたコマンド応答の一片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// 総断片数
    pub total: u8,
    /// 断片番号（0 始まり）
    pub index: u8,
    /// 断片ペイロード
    pub payload: &'a [u8],
}

/// 解析済みのサーバーパケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet<'a> {
    /// 型 0x00: ログイン応答
    Login(LoginResult),
    /// 型 0x01 でテキストを持たない応答（ACK 必須）
    CommandAck { sequence: u8 },
    /// 型 0x01 の分割なしテキスト（ACK 必須）
    Command { sequence: u8, text: &'a [u8] },
    /// 型 0x01 の断片
    Fragment(Fragment<'a>),
    /// 型 0x02: サーバーメッセージ（ACK 必須）
    Message { sequence: u8, text: &'a [u8] },
}

/// 受信バイト列に対する境界チェック付きビュー
///
/// 範囲外アクセスはパニックせず `ProtoError::TooShort` を返す。
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    bytes: &'a [u8],
}

impl<'a> PacketView<'a> {
    /// ヘッダーと型バイトの存在、プロトコルタグを検証してビューを作る
    ///
    /// # エラー
    /// - `ProtoError::TooShort`: 8 バイト未満
    /// - `ProtoError::BadTag`: 先頭が "BE" ではない
    pub fn new(bytes: &'a [u8]) -> Result<Self, ProtoError> {
        if bytes.len() < offset::TYPE + 1 {
            return Err(ProtoError::TooShort {
                needed: offset::TYPE + 1,
                actual: bytes.len(),
            });
        }

        let tag = [bytes[offset::TAG], bytes[offset::TAG + 1]];
        if tag != PROTOCOL_TAG {
            return Err(ProtoError::BadTag(tag));
        }

        Ok(PacketView { bytes })
    }

    fn byte(&self, at: usize) -> Result<u8, ProtoError> {
        self.bytes.get(at).copied().ok_or(ProtoError::TooShort {
            needed: at + 1,
            actual: self.bytes.len(),
        })
    }

    fn tail(&self, from: usize) -> Result<&'a [u8], ProtoError> {
        self.bytes.get(from..).ok_or(ProtoError::TooShort {
            needed: from,
            actual: self.bytes.len(),
        })
    }

    /// ヘッダーを含む受信バイト列全体（常に 8 バイト以上）
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn tag(&self) -> [u8; 2] {
        [self.bytes[offset::TAG], self.bytes[offset::TAG + 1]]
    }

    /// ヘッダーに書かれた CRC-32（リトルエンディアン）
    pub fn checksum(&self) -> u32 {
        let mut le = [0u8; 4];
        le.copy_from_slice(&self.bytes[offset::CHECKSUM..offset::CHECKSUM + 4]);
        u32::from_le_bytes(le)
    }

    pub fn marker(&self) -> u8 {
        self.bytes[offset::MARKER]
    }

    /// 型バイトそのもの
    pub fn raw_type(&self) -> u8 {
        self.bytes[offset::TYPE]
    }

    pub fn packet_type(&self) -> Result<PacketType, ProtoError> {
        PacketType::try_from(self.raw_type())
    }

    /// ヘッダーの CRC-32 が marker + payload と一致するか
    ///
    /// 診断用。サーバーを信頼する前提なので不一致でも破棄はしない。
    pub fn checksum_matches(&self) -> bool {
        self.checksum() == packet_checksum(self.marker(), &self.bytes[offset::TYPE..])
    }

    /// 型に応じてフィールドを解釈する
    pub fn decode(&self) -> Result<Packet<'a>, ProtoError> {
        match self.packet_type()? {
            PacketType::Login => {
                let result = self.byte(offset::LOGIN_RESULT)?;
                Ok(Packet::Login(LoginResult::from(result)))
            }
            PacketType::Message => {
                let sequence = self.byte(offset::SEQUENCE)?;
                let text = self.tail(offset::MESSAGE_TEXT)?;
                Ok(Packet::Message { sequence, text })
            }
            PacketType::Command => self.decode_command(),
        }
    }

    fn decode_command(&self) -> Result<Packet<'a>, ProtoError> {
        let reserved_0 = self.byte(offset::RESERVED_0)?;

        // シーケンス番号だけの応答（出力なしのコマンド）
        if self.bytes.len() == offset::RESERVED_1 {
            return Ok(Packet::CommandAck { sequence: reserved_0 });
        }

        let reserved_1 = self.byte(offset::RESERVED_1)?;
        if reserved_0 == 0 && reserved_1 == 0 {
            let total = self.byte(offset::FRAGMENT_TOTAL)?;
            let index = self.byte(offset::FRAGMENT_INDEX)?;
            let payload = self.tail(offset::FRAGMENT_PAYLOAD)?;
            return Ok(Packet::Fragment(Fragment { total, index, payload }));
        }

        Ok(Packet::Command {
            sequence: reserved_0,
            text: self.tail(offset::COMMAND_TEXT)?,
        })
    }
}

/// 受信バイト列を解析する
///
/// # エラー
/// - `ProtoError::TooShort`: 型が要求するオフセットまでバイトがない
/// - `ProtoError::BadTag`: プロトコルタグ不一致
/// - `ProtoError::UnknownType`: 型バイトが 0x00〜0x02 以外
pub fn parse(bytes: &[u8]) -> Result<Packet<'_>, ProtoError> {
    PacketView::new(bytes)?.decode()
}

/// ペイロードにヘッダーを付けて送信用パケットを作る
///
/// 全長は `HEADER_LEN + payload.len()`。
pub fn build_packet(payload: &[u8]) -> Vec<u8> {
    let crc = packet_checksum(MARKER, payload);

    let mut packet = Vec::with_capacity(HEADER_LEN + payload.len());
    packet.extend_from_slice(&PROTOCOL_TAG);
    packet.extend_from_slice(&crc.to_le_bytes());
    packet.push(MARKER);
    packet.extend_from_slice(payload);
    packet
}

/// ログインペイロード `[0x00, secret...]`
pub fn login_payload(secret: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(1 + secret.len());
    payload.push(PacketType::Login as u8);
    payload.extend_from_slice(secret.as_bytes());
    payload
}

/// コマンドペイロード `[0x01, 0x00, command...]`
pub fn command_payload(command: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(2 + command.len());
    payload.push(PacketType::Command as u8);
    payload.push(0x00);
    payload.extend_from_slice(command.as_bytes());
    payload
}

/// ACK ペイロード `[0x02, sequence]`
pub fn ack_payload(sequence: u8) -> Vec<u8> {
    alloc::vec![PacketType::Message as u8, sequence]
}

/// キープアライブペイロード `[0x01, 0x00, 0x00]`
pub fn keepalive_payload() -> Vec<u8> {
    alloc::vec![PacketType::Command as u8, 0x00, 0x00]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum;

    fn server_packet(payload: &[u8]) -> Vec<u8> {
        build_packet(payload)
    }

    #[test]
    fn test_build_layout() {
        let packet = build_packet(&command_payload("players"));

        assert_eq!(packet.len(), HEADER_LEN + 9);
        assert_eq!(&packet[0..2], b"BE");
        assert_eq!(packet[6], 0xFF);
        assert_eq!(&packet[7..], &[0x01, 0x00, b'p', b'l', b'a', b'y', b'e', b'r', b's']);

        // チェックサムは marker + payload に対して計算され、LE で格納される
        let expected = checksum(&packet[6..]);
        assert_eq!(&packet[2..6], &expected.to_le_bytes());
    }

    #[test]
    fn test_build_empty_payload() {
        let packet = build_packet(&[]);
        assert_eq!(packet.len(), HEADER_LEN);
        assert_eq!(&packet[2..6], &checksum(&[0xFF]).to_le_bytes());
    }

    #[test]
    fn test_payload_builders() {
        assert_eq!(login_payload("pw"), alloc::vec![0x00, b'p', b'w']);
        assert_eq!(command_payload(""), alloc::vec![0x01, 0x00]);
        assert_eq!(ack_payload(0xFE), alloc::vec![0x02, 0xFE]);
        assert_eq!(keepalive_payload(), alloc::vec![0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse(&server_packet(&[0x00, 0x01])),
            Ok(Packet::Login(LoginResult::Accepted))
        );
        assert_eq!(
            parse(&server_packet(&[0x00, 0x00])),
            Ok(Packet::Login(LoginResult::Rejected))
        );
        assert_eq!(
            parse(&server_packet(&[0x00, 0x07])),
            Ok(Packet::Login(LoginResult::Unrecognized(0x07)))
        );
    }

    #[test]
    fn test_parse_login_missing_result() {
        let binding = server_packet(&[0x00]);
        let result = parse(&binding);
        assert_eq!(result, Err(ProtoError::TooShort { needed: 9, actual: 8 }));
    }

    #[test]
    fn test_parse_message() {
        let packet = server_packet(b"\x02\x05Player joined");
        assert_eq!(
            parse(&packet),
            Ok(Packet::Message { sequence: 5, text: b"Player joined" })
        );
    }

    #[test]
    fn test_parse_message_empty_text() {
        let packet = server_packet(&[0x02, 0xFF]);
        assert_eq!(parse(&packet), Ok(Packet::Message { sequence: 255, text: b"" }));
    }

    #[test]
    fn test_parse_fragment() {
        let packet = server_packet(b"\x01\x00\x00\x03\x01middle");
        assert_eq!(
            parse(&packet),
            Ok(Packet::Fragment(Fragment { total: 3, index: 1, payload: b"middle" }))
        );
    }

    #[test]
    fn test_parse_fragment_header_truncated() {
        let packet = server_packet(&[0x01, 0x00, 0x00, 0x02]);
        assert_eq!(parse(&packet), Err(ProtoError::TooShort { needed: 12, actual: 11 }));
    }

    #[test]
    fn test_parse_unfragmented_command() {
        let packet = server_packet(b"\x01\x00Players on server:");
        assert_eq!(
            parse(&packet),
            Ok(Packet::Command { sequence: 0, text: b"Players on server:" })
        );
    }

    #[test]
    fn test_parse_unfragmented_command_keeps_sequence() {
        let packet = server_packet(b"\x01\x05Players on server:");
        assert_eq!(
            parse(&packet),
            Ok(Packet::Command { sequence: 5, text: b"Players on server:" })
        );
    }

    #[test]
    fn test_parse_command_ack_without_text() {
        let packet = server_packet(&[0x01, 0x00]);
        assert_eq!(packet.len(), 9);
        assert_eq!(parse(&packet), Ok(Packet::CommandAck { sequence: 0 }));
    }

    #[test]
    fn test_parse_bad_tag() {
        let mut packet = server_packet(&[0x00, 0x01]);
        packet[0] = b'X';
        assert_eq!(parse(&packet), Err(ProtoError::BadTag([b'X', b'E'])));
    }

    #[test]
    fn test_parse_unknown_type() {
        let packet = server_packet(&[0x09, 0x00]);
        assert_eq!(parse(&packet), Err(ProtoError::UnknownType(0x09)));
    }

    #[test]
    fn test_parse_too_short_header() {
        assert_eq!(
            parse(b"BE\x00\x00"),
            Err(ProtoError::TooShort { needed: 8, actual: 4 })
        );
        assert_eq!(parse(&[]), Err(ProtoError::TooShort { needed: 8, actual: 0 }));
    }

    #[test]
    fn test_view_header_fields() {
        let packet = build_packet(&ack_payload(9));
        let view = PacketView::new(&packet).unwrap();

        assert_eq!(view.as_bytes(), packet.as_slice());
        assert_eq!(view.tag(), PROTOCOL_TAG);
        assert_eq!(view.marker(), MARKER);
        assert_eq!(view.packet_type(), Ok(PacketType::Message));
        assert_eq!(view.checksum(), checksum(&packet[6..]));
        assert!(view.checksum_matches());
    }

    #[test]
    fn test_view_detects_corrupted_checksum() {
        let mut packet = build_packet(b"\x02\x01hello");
        packet[12] ^= 0x20;

        let view = PacketView::new(&packet).unwrap();
        assert!(!view.checksum_matches());
        // 解析自体は成功する
        assert!(view.decode().is_ok());
    }
}
