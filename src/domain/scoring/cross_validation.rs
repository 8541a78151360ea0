// k分割交差検証による汎化スコアの推定

use rayon::prelude::*;

use super::knn;

/// 離散ターゲット: クラスごとの出現順ラウンドロビンで層化分割する
fn stratified_folds(targets: &[f64], folds: usize) -> Vec<usize> {
    let mut assignment = vec![0usize; targets.len()];
    let mut class_counts: Vec<(f64, usize)> = Vec::new();
    for (i, &t) in targets.iter().enumerate() {
        let seen = match class_counts.iter_mut().find(|(class, _)| *class == t) {
            Some(entry) => {
                entry.1 += 1;
                entry.1 - 1
            }
            None => {
                class_counts.push((t, 1));
                0
            }
        };
        assignment[i] = seen % folds;
    }
    assignment
}

/// 連続ターゲット: 先頭から連続ブロックで分割する（先頭側が1行多い）
fn contiguous_folds(len: usize, folds: usize) -> Vec<usize> {
    let base = len / folds;
    let extra = len % folds;
    let mut assignment = Vec::with_capacity(len);
    for fold in 0..folds {
        let size = base + usize::from(fold < extra);
        assignment.extend(std::iter::repeat(fold).take(size));
    }
    assignment
}

/// 分類の一致率
fn accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    let hits = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    hits as f64 / actual.len() as f64
}

/// 決定係数R²（ターゲットの分散がゼロの場合は0.0）
fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot <= 0.0 {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    1.0 - ss_res / ss_tot
}

/// k近傍予測をfolds分割の交差検証で評価し、使えた分割のスコア平均を返す
///
/// 訓練側または評価側が空になった分割は飛ばす。使える分割が
/// ひとつもなければNone。分割スコアは分割番号順に集めるため、
/// 並列化しても結果は決定的。
pub fn cross_validate(
    points: &[[f64; 2]],
    targets: &[f64],
    discrete: bool,
    k_neighbors: usize,
    folds: usize,
) -> Option<f64> {
    let assignment = if discrete {
        stratified_folds(targets, folds)
    } else {
        contiguous_folds(targets.len(), folds)
    };

    let fold_scores: Vec<Option<f64>> = (0..folds)
        .into_par_iter()
        .map(|fold| {
            let mut train_points = Vec::new();
            let mut train_targets = Vec::new();
            let mut test_points = Vec::new();
            let mut test_targets = Vec::new();
            for (i, &assigned) in assignment.iter().enumerate() {
                if assigned == fold {
                    test_points.push(points[i]);
                    test_targets.push(targets[i]);
                } else {
                    train_points.push(points[i]);
                    train_targets.push(targets[i]);
                }
            }
            if train_points.is_empty() || test_points.is_empty() {
                return None;
            }

            let predictions: Vec<f64> = test_points
                .iter()
                .map(|&query| {
                    if discrete {
                        knn::classify(&train_points, &train_targets, query, k_neighbors)
                    } else {
                        knn::regress(&train_points, &train_targets, query, k_neighbors)
                    }
                })
                .collect();

            Some(if discrete {
                accuracy(&test_targets, &predictions)
            } else {
                r_squared(&test_targets, &predictions)
            })
        })
        .collect();

    let usable: Vec<f64> = fold_scores.into_iter().flatten().collect();
    if usable.is_empty() {
        None
    } else {
        Some(usable.iter().sum::<f64>() / usable.len() as f64)
    }
}
