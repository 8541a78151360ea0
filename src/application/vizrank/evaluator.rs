// 射影評価器（部分集合 → Radviz → k近傍交差検証スコア）

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::constants::{CV_FOLDS, MIN_VALID_ROWS, SCORING_NEIGHBORS};
use crate::domain::data::Dataset;
use crate::domain::projection::radviz;
use crate::domain::scoring::cross_validate;
use crate::domain::search::{SearchState, UnscorableState};

/// 状態ごとのスコア計算器
///
/// 実行開始時に固定された候補順のもとで、状態（候補順インデックス列）を
/// データセットの列に解決し、Radviz埋め込み上のk近傍交差検証で評価する。
pub struct ProjectionEvaluator {
    dataset: Arc<Dataset>,
    /// 候補順 → データセット列インデックス
    ranked_columns: Vec<usize>,
    target_column: usize,
    target_discrete: bool,
    sample_percent: u8,
    sample_seed: u64,
}

impl ProjectionEvaluator {
    pub fn new(
        dataset: Arc<Dataset>,
        ranked_columns: Vec<usize>,
        target_column: usize,
        target_discrete: bool,
        sample_percent: u8,
        sample_seed: u64,
    ) -> Self {
        Self {
            dataset,
            ranked_columns,
            target_column,
            target_discrete,
            sample_percent,
            sample_seed,
        }
    }

    /// 状態のスコアを計算する（小さいほど良い: 負号反転した平均CVスコア）
    ///
    /// 評価不能はエラーとして返し、呼び出し側が最悪スコアに吸収する。
    pub fn score_state(&self, state: &SearchState) -> Result<f64, UnscorableState> {
        let columns: Vec<usize> = state.iter().map(|&i| self.ranked_columns[i]).collect();
        let mut involved = columns.clone();
        involved.push(self.target_column);

        let mask = self.dataset.valid_mask(&involved);
        let rows = self.dataset.select_rows(&columns, &mask);
        let target_values = self.dataset.select_column(self.target_column, &mask);
        if rows.len() < MIN_VALID_ROWS {
            return Err(UnscorableState::TooFewRows);
        }

        // 状態の並び順のままRadviz埋め込みを計算する
        let embedding = radviz::project(&rows);
        let mut points = Vec::with_capacity(embedding.valid_count());
        let mut targets = Vec::with_capacity(embedding.valid_count());
        for (i, &valid) in embedding.mask.iter().enumerate() {
            if valid {
                points.push(embedding.points[i]);
                targets.push(target_values[i]);
            }
        }
        if points.is_empty() {
            return Err(UnscorableState::EmptyEmbedding);
        }
        if points.len() < MIN_VALID_ROWS {
            return Err(UnscorableState::TooFewRows);
        }

        if self.sample_percent < 100 {
            self.subsample(state, &mut points, &mut targets);
        }

        let mean = cross_validate(
            &points,
            &targets,
            self.target_discrete,
            SCORING_NEIGHBORS,
            CV_FOLDS,
        )
        .ok_or(UnscorableState::TooFewRows)?;
        Ok(-mean)
    }

    /// 有効行から設定割合だけ非復元抽出する（行順は保つ）
    ///
    /// シードは状態の内容から導くため、呼び出し順に依らず同じ状態には
    /// 常に同じサンプルが使われる。
    fn subsample(&self, state: &SearchState, points: &mut Vec<[f64; 2]>, targets: &mut Vec<f64>) {
        let take = (points.len() * self.sample_percent as usize / 100).max(MIN_VALID_ROWS);
        if take >= points.len() {
            return;
        }
        let mut rng = StdRng::seed_from_u64(state_seed(self.sample_seed, state));
        let mut chosen = rand::seq::index::sample(&mut rng, points.len(), take).into_vec();
        chosen.sort_unstable();
        *points = chosen.iter().map(|&i| points[i]).collect();
        *targets = chosen.iter().map(|&i| targets[i]).collect();
    }
}

/// 状態内容からサンプリング用シードを導く（FNV風の混合）
fn state_seed(base: u64, state: &SearchState) -> u64 {
    let mut seed = base ^ 0xcbf2_9ce4_8422_2325;
    for &index in state {
        seed = seed
            .wrapping_mul(0x0000_0100_0000_01b3)
            .wrapping_add(index as u64 + 1);
    }
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::data::Variable;

    /// 2クラスが3変数でよく分かれる小さなデータセット
    fn separable_dataset() -> Arc<Dataset> {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut c = Vec::new();
        let mut y = Vec::new();
        for i in 0..12 {
            let class = f64::from(i % 2);
            let jitter = f64::from(i / 2) * 0.05;
            a.push(class * 4.0 + jitter);
            b.push((1.0 - class) * 4.0 + jitter);
            c.push(class * 2.0 + 1.0 + jitter);
            y.push(class);
        }
        Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::discrete("y"),
                ],
                vec![a, b, c, y],
            )
            .unwrap(),
        )
    }

    fn evaluator(dataset: Arc<Dataset>, percent: u8) -> ProjectionEvaluator {
        ProjectionEvaluator::new(dataset, vec![0, 1, 2], 3, true, percent, 0)
    }

    #[test]
    fn separable_projection_scores_negative() {
        let eval = evaluator(separable_dataset(), 100);
        let score = eval.score_state(&vec![0, 1, 2]).unwrap();
        // 精度は正なので、負号反転したスコアは負になる
        assert!(score < 0.0, "score={}", score);
        assert!(score >= -1.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let eval = evaluator(separable_dataset(), 100);
        let first = eval.score_state(&vec![0, 2, 1]).unwrap();
        let second = eval.score_state(&vec![0, 2, 1]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn constant_columns_are_unscorable() {
        let dataset = Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::discrete("y"),
                ],
                vec![
                    vec![1.0; 6],
                    vec![2.0; 6],
                    vec![3.0; 6],
                    vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
                ],
            )
            .unwrap(),
        );
        let eval = evaluator(dataset, 100);
        assert_eq!(
            eval.score_state(&vec![0, 1, 2]),
            Err(UnscorableState::EmptyEmbedding)
        );
    }

    #[test]
    fn missing_rows_are_dropped_before_projection() {
        let dataset = Arc::new(
            Dataset::new(
                vec![
                    Variable::continuous("a"),
                    Variable::continuous("b"),
                    Variable::continuous("c"),
                    Variable::discrete("y"),
                ],
                vec![
                    vec![f64::NAN, 1.0],
                    vec![0.5, 2.0],
                    vec![1.5, 3.0],
                    vec![0.0, 1.0],
                ],
            )
            .unwrap(),
        );
        let eval = evaluator(dataset, 100);
        // 欠損を除くと1行しか残らない
        assert_eq!(
            eval.score_state(&vec![0, 1, 2]),
            Err(UnscorableState::TooFewRows)
        );
    }

    #[test]
    fn subsampling_keeps_the_same_rows_per_state() {
        let eval = evaluator(separable_dataset(), 50);
        let first = eval.score_state(&vec![0, 1, 2]).unwrap();
        let second = eval.score_state(&vec![0, 1, 2]).unwrap();
        assert_eq!(first, second);
    }
}
