// 進捗管理

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 進捗統計
#[derive(Clone, Debug, Default)]
pub struct ProgressStats {
    /// 評価済み状態数（単調増加、新規実行でのみ0に戻る）
    pub evaluated: u64,
    /// スコア化できなかった状態数
    pub unscorable: u64,
}

/// 進捗マネージャー
///
/// 協調的なステップ駆動の間、評価カウンタと中断フラグを保持する。
pub struct ProgressManager {
    abort_flag: Arc<AtomicBool>,
    evaluated: Arc<AtomicU64>,
    unscorable: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            abort_flag: Arc::new(AtomicBool::new(false)),
            evaluated: Arc::new(AtomicU64::new(0)),
            unscorable: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// 中断フラグを取得
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort_flag)
    }

    /// 探索を中断
    pub fn abort(&self) {
        self.abort_flag.store(true, Ordering::Relaxed);
    }

    /// 中断されたかチェック
    pub fn is_aborted(&self) -> bool {
        self.abort_flag.load(Ordering::Relaxed)
    }

    /// 評価カウンタを1進め、新しい値を返す
    pub fn add_evaluated(&self) -> u64 {
        self.evaluated.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 評価不能カウンタを1進める
    pub fn add_unscorable(&self) {
        self.unscorable.fetch_add(1, Ordering::Relaxed);
    }

    /// 評価カウンタを外部の値に合わせる（チェックポイント復元用）
    pub fn set_evaluated(&self, value: u64) {
        self.evaluated.store(value, Ordering::Relaxed);
    }

    /// 現在の統計を取得
    pub fn get_stats(&self) -> ProgressStats {
        ProgressStats {
            evaluated: self.evaluated.load(Ordering::Relaxed),
            unscorable: self.unscorable.load(Ordering::Relaxed),
        }
    }

    /// 経過時間を取得
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 評価速度（状態/秒）を取得
    pub fn states_per_second(&self) -> f64 {
        let evaluated = self.evaluated.load(Ordering::Relaxed) as f64;
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            evaluated / elapsed
        } else {
            0.0
        }
    }

    /// リセット（新規実行の開始時のみ呼ばれる）
    pub fn reset(&mut self) {
        self.abort_flag.store(false, Ordering::Relaxed);
        self.evaluated.store(0, Ordering::Relaxed);
        self.unscorable.store(0, Ordering::Relaxed);
        self.start_time = Instant::now();
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
