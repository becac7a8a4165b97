//! キープアライブと生存確認のスケジューラ
//!
//! UDP には切断通知がないため、サーバーの消失は「送ったのに返ってこない」
//! ことでしか検出できない。送信のたびに単発の確認期限を積み、期限が来た時点で
//! 最後の受信時刻を見て判断する。

use alloc::collections::BinaryHeap;
use core::cmp::Reverse;

use crate::config::SessionConfig;

/// セッションが所有するタイマー群
///
/// 実時間のタイマーは持たず、期限（ミリ秒）だけを保持する。
/// `stop()` で全期限を破棄するので、閉じたセッションに対して発火することはない。
#[derive(Debug)]
pub struct KeepAliveScheduler {
    interval_ms: u64,
    check_delay_ms: u64,
    liveness_timeout_ms: u64,
    /// 次のキープアライブ送信時刻
    next_keepalive_at: Option<u64>,
    /// 生存確認の期限（最小ヒープ）
    checks: BinaryHeap<Reverse<u64>>,
}

impl KeepAliveScheduler {
    pub fn new(config: &SessionConfig) -> Self {
        KeepAliveScheduler {
            interval_ms: config.keepalive_interval_ms,
            check_delay_ms: config.timeout_check_delay_ms,
            liveness_timeout_ms: config.liveness_timeout_ms,
            next_keepalive_at: None,
            checks: BinaryHeap::new(),
        }
    }

    /// 周期タイマーを開始する
    pub fn start(&mut self, now_ms: u64) {
        self.next_keepalive_at = Some(now_ms.saturating_add(self.interval_ms));
    }

    /// 全タイマーを止める
    pub fn stop(&mut self) {
        self.next_keepalive_at = None;
        self.checks.clear();
    }

    pub fn is_running(&self) -> bool {
        self.next_keepalive_at.is_some()
    }

    /// 送信直後に呼び、生存確認を予約する
    pub fn arm_check(&mut self, now_ms: u64) {
        self.checks.push(Reverse(now_ms.saturating_add(self.check_delay_ms)));
    }

    /// 予約中の生存確認の数
    pub fn pending_checks(&self) -> usize {
        self.checks.len()
    }

    /// 最も早い期限
    pub fn next_deadline(&self) -> Option<u64> {
        let check = self.checks.peek().map(|Reverse(at)| *at);
        match (self.next_keepalive_at, check) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// 期限切れの生存確認を取り除き、その数を返す
    pub fn take_expired_checks(&mut self, now_ms: u64) -> usize {
        let mut expired = 0;
        while let Some(Reverse(at)) = self.checks.peek() {
            if *at > now_ms {
                break;
            }
            self.checks.pop();
            expired += 1;
        }
        expired
    }

    /// キープアライブの送信時刻に達していれば次回を予約して `true` を返す
    pub fn keepalive_due(&mut self, now_ms: u64) -> bool {
        match self.next_keepalive_at {
            Some(at) if now_ms >= at => {
                self.next_keepalive_at = Some(now_ms.saturating_add(self.interval_ms));
                true
            }
            _ => false,
        }
    }

    /// 最後の受信から閾値以上経過しているか
    ///
    /// 一度も受信していない場合は無応答とみなす（ログイン応答が来ない）。
    pub fn is_silent(&self, now_ms: u64, last_inbound_at: Option<u64>) -> bool {
        match last_inbound_at {
            Some(at) => now_ms.saturating_sub(at) >= self.liveness_timeout_ms,
            None => true,
        }
    }
}
