// リーダーボード（評価完了順の結果保持）

use std::cmp::Ordering;

use crate::domain::data::Variable;
use crate::domain::search::{ScoredState, SearchState};

/// リーダーボードの1エントリ
#[derive(Clone, Debug)]
pub struct RankedEntry {
    /// 挿入順のラベル（1始まり、列挙順を反映する）
    pub index: usize,
    /// 評価された状態（候補順インデックス列）
    pub state: SearchState,
    /// 保存スコア（小さいほど良い）
    pub score: f64,
    /// 表示用の説明（負号反転したスコアと変数名の列挙）
    pub description: String,
    /// 状態を構成する変数（列挙で発行された並び順）
    pub variables: Vec<Variable>,
}

impl RankedEntry {
    /// タイブレークに使う連結変数名
    fn joined_names(&self) -> String {
        self.variables
            .iter()
            .map(Variable::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 表示用に整列済みの結果
#[derive(Clone, Debug)]
pub struct RankedResult {
    /// 整列後の順位（1始まり）
    pub rank: usize,
    pub score: f64,
    pub variable_names: Vec<String>,
    pub variables: Vec<Variable>,
}

/// 評価完了順に追記される結果の集合
///
/// 挿入順はスコアと無関係に列挙順を保つ。表示側は`best`で整列し直す。
/// 新規実行の開始時にクリアされる。
#[derive(Default)]
pub struct Leaderboard {
    entries: Vec<RankedEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// スコア付き状態を追記する
    pub fn push(&mut self, scored: ScoredState, variables: Vec<Variable>) -> &RankedEntry {
        let ScoredState { state, score } = scored;
        let names = variables
            .iter()
            .map(Variable::name)
            .collect::<Vec<_>>()
            .join(", ");
        let entry = RankedEntry {
            index: self.entries.len() + 1,
            state,
            score,
            description: format!("[{:.6}] {}", -score, names),
            variables,
        };
        let at = self.entries.len();
        self.entries.push(entry);
        &self.entries[at]
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// 指定行の変数リスト（選択コールバック用）
    pub fn variables_at(&self, row: usize) -> Option<&[Variable]> {
        self.entries.get(row).map(|e| e.variables.as_slice())
    }

    /// スコア昇順（同点は連結変数名の辞書順）で上位n件を返す
    pub fn best(&self, n: usize) -> Vec<RankedResult> {
        let mut order: Vec<&RankedEntry> = self.entries.iter().collect();
        order.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.joined_names().cmp(&b.joined_names()))
        });
        order
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, entry)| RankedResult {
                rank: i + 1,
                score: entry.score,
                variable_names: entry.variables.iter().map(|v| v.name().to_string()).collect(),
                variables: entry.variables.clone(),
            })
            .collect()
    }
}
