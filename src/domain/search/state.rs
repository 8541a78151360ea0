// 探索状態とチェックポイント

use serde::{Deserialize, Serialize};

/// 1つの候補射影を表す、順序付き変数インデックス列（長さ3以上）
///
/// インデックスは実行ごとに固定される候補順（事前ランキング順）を指す。
pub type SearchState = Vec<usize>;

/// スコア付きの探索状態（スコアは小さいほど良い）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredState {
    pub state: SearchState,
    pub score: f64,
}

/// 列挙を中断位置から正確に再開するための最小情報
///
/// 一時停止・中断時に作られ、再開時に消費される。
/// 最大サイズの変更や候補順の不一致で無効になり、破棄される。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchCheckpoint {
    /// 最後に評価を終えた状態
    pub last_state: SearchState,
    /// 実行時の候補変数順（名前）
    pub ranked_names: Vec<String>,
    /// 実行時の最大部分集合サイズ
    pub max_size: usize,
    /// 評価済み状態数
    pub evaluated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_json_roundtrip() {
        let checkpoint = SearchCheckpoint {
            last_state: vec![0, 2, 1],
            ranked_names: vec!["a".into(), "b".into(), "c".into()],
            max_size: 4,
            evaluated: 17,
        };

        let json = serde_json::to_string(&checkpoint).unwrap();
        let restored: SearchCheckpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, checkpoint);
    }
}
