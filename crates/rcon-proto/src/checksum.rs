//! パケットヘッダー用 CRC-32
//!
//! zip / PNG と同じ反射 CRC-32（多項式 0xEDB88320、初期値・最終 XOR 0xFFFFFFFF）。
//! 完全性チェック用であり、暗号学的な認証ではない。

use crc::{Crc, CRC_32_ISO_HDLC};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// バイト列の CRC-32 を計算する
pub fn checksum(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// マーカーバイト + ペイロードの CRC-32 を計算する
///
/// ヘッダーに書き込む値はこちら。中間バッファを確保せずに
/// `[marker][payload...]` を連結した場合と同じ値を返す。
pub fn packet_checksum(marker: u8, payload: &[u8]) -> u32 {
    let mut digest = CRC32.digest();
    digest.update(&[marker]);
    digest.update(payload);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(checksum(b""), 0x0000_0000);
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            checksum(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn test_single_byte_vectors() {
        assert_eq!(checksum(&[0x00]), 0xD202_EF8D);
        assert_eq!(checksum(b"a"), 0xE8B7_BE43);
    }

    #[test]
    fn test_packet_checksum_matches_concatenation() {
        let payload = b"\x01\x00players";
        let mut joined = alloc::vec![0xFFu8];
        joined.extend_from_slice(payload);

        assert_eq!(packet_checksum(0xFF, payload), checksum(&joined));
    }

    #[test]
    fn test_deterministic() {
        let data = b"say -1 hello";
        assert_eq!(checksum(data), checksum(data));
        assert_ne!(checksum(data), checksum(b"say -1 hellp"));
    }
}
