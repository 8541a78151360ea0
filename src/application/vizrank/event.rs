// ランキング探索のイベント定義（表示層に依存しない）

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// 探索進捗の統計情報
#[derive(Clone, Debug)]
pub struct RankProgress {
    pub searching: bool,
    /// 評価済み状態数（単調増加）
    pub evaluated: u64,
    /// スコア化できなかった状態数
    pub unscorable: u64,
    /// 現在の設定で列挙される状態の総数
    pub total_states: BigUint,
    /// 評価速度（状態/秒）
    pub rate: f64,
    /// リーダーボードの件数
    pub leaderboard_len: usize,
}

impl RankProgress {
    /// 進捗率（0.0~1.0）。総数が表現できないほど大きい場合は0.0。
    pub fn fraction(&self) -> f64 {
        match (self.evaluated.to_f64(), self.total_states.to_f64()) {
            (Some(done), Some(total)) if total > 0.0 => (done / total).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

impl Default for RankProgress {
    fn default() -> Self {
        Self {
            searching: false,
            evaluated: 0,
            unscorable: 0,
            total_states: BigUint::zero(),
            rate: 0.0,
            leaderboard_len: 0,
        }
    }
}

/// 探索エンジンからのイベント
#[derive(Clone, Debug)]
pub enum RankEvent {
    /// ログメッセージ
    Log(String),
    /// 進捗更新（各ステップ後）
    Progress(RankProgress),
    /// 探索完了
    Finished(RankProgress),
    /// エラー発生（実行は継続する）
    Error(String),
}
