//! 断片の再組み立て
//!
//! ## Fragment Header（型 0x01、予約バイトが両方 0 のとき）
//! ```text
//! [reserved: 0x00][reserved: 0x00][total: u8][index: u8][payload...]
//! ```

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};
use rcon_proto::Fragment;

/// 断片を受け取り、一つのメッセージに再組み立てするクラス
///
/// 断片は順不同で届く。スロット配列は最初に見た断片の総数で確保され、
/// すべてのスロットが埋まった時点で番号順に連結して返す。
/// 返した後はバッファを破棄するので、二つのメッセージにまたがって残ることはない。
///
/// - 総数が進行中の配列と異なる断片は破棄する（番号 0 のものは新しいメッセージとみなす）
/// - スロット 0 が既に埋まっている状態で番号 0 が来たら、古い組み立てを捨てて作り直す
#[derive(Debug, Default)]
pub struct FragmentReassembler {
    /// 番号ごとのスロット。組み立て中のみ Some
    slots: Option<Vec<Option<Vec<u8>>>>,
}

impl FragmentReassembler {
    pub fn new() -> Self {
        FragmentReassembler { slots: None }
    }

    /// 断片を追加する
    ///
    /// # 戻り値
    /// - `Some(Vec<u8>)`: 全断片が揃い、番号順に連結したバイト列
    /// - `None`: まだ足りない、または断片を破棄した
    pub fn add_fragment(&mut self, frag: Fragment<'_>) -> Option<Vec<u8>> {
        if frag.total == 0 || frag.index >= frag.total {
            debug!(
                "dropping fragment {} of {}: index out of range",
                frag.index, frag.total
            );
            return None;
        }

        let total = frag.total as usize;
        let index = frag.index as usize;

        let start_new = match &self.slots {
            None => true,
            Some(slots) if slots.len() != total => index == 0,
            Some(slots) => index == 0 && slots[0].is_some(),
        };

        if start_new {
            if self.slots.is_some() {
                debug!("abandoning incomplete message for a new one of {} fragments", total);
            }
            self.slots = Some(vec![None; total]);
        }

        let slots = match self.slots.as_mut() {
            Some(slots) if slots.len() == total => slots,
            Some(slots) => {
                debug!(
                    "dropping fragment {}: total {} does not match assembly of {}",
                    index,
                    total,
                    slots.len()
                );
                return None;
            }
            None => return None,
        };

        if slots[index].is_some() {
            trace!("duplicate fragment {} of {}", index, total);
        }
        slots[index] = Some(frag.payload.to_vec());

        if slots.iter().any(Option::is_none) {
            return None;
        }

        let slots = self.slots.take()?;
        let mut assembled = Vec::with_capacity(slots.iter().flatten().map(Vec::len).sum());
        for part in slots.into_iter().flatten() {
            assembled.extend_from_slice(&part);
        }
        Some(assembled)
    }

    /// 組み立て中のメッセージがあるか
    pub fn is_assembling(&self) -> bool {
        self.slots.is_some()
    }

    /// 組み立て中のメッセージの総断片数
    pub fn expected_total(&self) -> Option<usize> {
        self.slots.as_ref().map(Vec::len)
    }

    /// 受信済みの断片数
    pub fn received(&self) -> usize {
        self.slots
            .as_ref()
            .map_or(0, |slots| slots.iter().filter(|s| s.is_some()).count())
    }

    /// 組み立て中のバッファを破棄する
    pub fn reset(&mut self) {
        self.slots = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(total: u8, index: u8, payload: &[u8]) -> Fragment<'_> {
        Fragment { total, index, payload }
    }

    #[test]
    fn test_single_fragment_message() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(1, 0, b"only")), Some(b"only".to_vec()));
        assert!(!r.is_assembling());
    }

    #[test]
    fn test_in_order_assembly() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(3, 0, b"aa")), None);
        assert_eq!(r.add_fragment(frag(3, 1, b"bb")), None);
        assert_eq!(r.received(), 2);
        assert_eq!(r.add_fragment(frag(3, 2, b"cc")), Some(b"aabbcc".to_vec()));
        assert!(!r.is_assembling());
    }

    #[test]
    fn test_out_of_order_assembly() {
        let mut r = FragmentReassembler::new();

        // 最後の断片が先に届いても完成しない
        assert_eq!(r.add_fragment(frag(3, 2, b"3")), None);
        assert_eq!(r.add_fragment(frag(3, 0, b"1")), None);
        assert_eq!(r.expected_total(), Some(3));

        let result = r.add_fragment(frag(3, 1, b"2"));
        assert_eq!(result, Some(b"123".to_vec()), "番号順に連結されるべき");
    }

    #[test]
    fn test_last_index_before_predecessors_is_not_emitted() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(4, 0, b"a")), None);
        assert_eq!(r.add_fragment(frag(4, 3, b"d")), None);
        assert_eq!(r.add_fragment(frag(4, 1, b"b")), None);
        assert_eq!(r.add_fragment(frag(4, 2, b"c")), Some(b"abcd".to_vec()));
    }

    #[test]
    fn test_new_message_abandons_stale_assembly() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(2, 0, b"stale")), None);

        // スロット 0 が埋まっている状態で番号 0 → 新しいメッセージ
        assert_eq!(r.add_fragment(frag(2, 0, b"fresh-")), None);
        assert_eq!(r.add_fragment(frag(2, 1, b"tail")), Some(b"fresh-tail".to_vec()));
    }

    #[test]
    fn test_new_message_with_different_total() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(3, 0, b"x")), None);
        assert_eq!(r.add_fragment(frag(2, 0, b"new-")), None);
        assert_eq!(r.expected_total(), Some(2));
        assert_eq!(r.add_fragment(frag(2, 1, b"msg")), Some(b"new-msg".to_vec()));
    }

    #[test]
    fn test_mismatched_total_is_dropped() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(3, 0, b"a")), None);

        // 総数が違う非 0 番の断片は進行中の組み立てを壊さない
        assert_eq!(r.add_fragment(frag(5, 1, b"junk")), None);
        assert_eq!(r.received(), 1);

        assert_eq!(r.add_fragment(frag(3, 1, b"b")), None);
        assert_eq!(r.add_fragment(frag(3, 2, b"c")), Some(b"abc".to_vec()));
    }

    #[test]
    fn test_invalid_headers_are_dropped() {
        let mut r = FragmentReassembler::new();
        assert_eq!(r.add_fragment(frag(0, 0, b"zero total")), None);
        assert_eq!(r.add_fragment(frag(2, 2, b"past end")), None);
        assert!(!r.is_assembling());
    }

    #[test]
    fn test_buffer_cleared_between_messages() {
        let mut r = FragmentReassembler::new();
        assert!(r.add_fragment(frag(2, 1, b"B")).is_none());
        assert_eq!(r.add_fragment(frag(2, 0, b"A")), Some(b"AB".to_vec()));
        assert_eq!(r.expected_total(), None);

        assert!(r.add_fragment(frag(2, 0, b"C")).is_none());
        assert_eq!(r.add_fragment(frag(2, 1, b"D")), Some(b"CD".to_vec()));
    }

    #[test]
    fn test_reset() {
        let mut r = FragmentReassembler::new();
        r.add_fragment(frag(2, 0, b"x"));
        r.reset();
        assert!(!r.is_assembling());
        assert_eq!(r.received(), 0);
    }
}
