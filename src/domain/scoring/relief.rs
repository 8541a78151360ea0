// ReliefF / RReliefF による変数の事前ランキング

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::cmp::Ordering;

use crate::domain::data::{VarKind, Variable};

/// 属性値の正規化された差分（離散: 一致0/不一致1、連続: 値域で正規化）
fn attr_diff(kind: VarKind, a: f64, b: f64, range: f64) -> f64 {
    match kind {
        VarKind::Discrete => {
            if a == b {
                0.0
            } else {
                1.0
            }
        }
        VarKind::Continuous => {
            if range > 0.0 {
                ((a - b) / range).abs()
            } else {
                0.0
            }
        }
    }
}

/// 行間距離（全属性の差分和）
fn row_distance(kinds: &[VarKind], ranges: &[f64], a: &[f64], b: &[f64]) -> f64 {
    kinds
        .iter()
        .enumerate()
        .map(|(j, &kind)| attr_diff(kind, a[j], b[j], ranges[j]))
        .sum()
}

/// 連続属性の値域
fn attr_ranges(rows: &[Vec<f64>], width: usize) -> Vec<f64> {
    let mut lo = vec![f64::INFINITY; width];
    let mut hi = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for (j, &v) in row.iter().enumerate() {
            lo[j] = lo[j].min(v);
            hi[j] = hi[j].max(v);
        }
    }
    (0..width)
        .map(|j| if hi[j] > lo[j] { hi[j] - lo[j] } else { 0.0 })
        .collect()
}

/// サンプリング対象の行（行数が反復回数以下なら全行、超えるならシード付き非復元抽出）
fn sample_rows(n_rows: usize, iterations: usize, seed: u64) -> Vec<usize> {
    if n_rows <= iterations {
        return (0..n_rows).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sampled = rand::seq::index::sample(&mut rng, n_rows, iterations).into_vec();
    sampled.sort_unstable();
    sampled
}

/// 行iから他の全行を距離昇順（同距離はインデックス昇順）に並べる
fn neighbors_by_distance(
    rows: &[Vec<f64>],
    kinds: &[VarKind],
    ranges: &[f64],
    i: usize,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).filter(|&j| j != i).collect();
    order.sort_by(|&a, &b| {
        row_distance(kinds, ranges, &rows[i], &rows[a])
            .partial_cmp(&row_distance(kinds, ranges, &rows[i], &rows[b]))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// ReliefF（離散ターゲット）による属性重み
///
/// サンプリングした各行について、同クラスのk近傍（ヒット）との差分を
/// 減点し、他クラスのk近傍（ミス）との差分を事前確率で重み付けして
/// 加点する。サンプルごとの寄与をサンプル順に集めるため決定的。
pub fn relieff_weights(
    rows: &[Vec<f64>],
    kinds: &[VarKind],
    targets: &[f64],
    iterations: usize,
    k: usize,
    seed: u64,
) -> Vec<f64> {
    let width = kinds.len();
    let n = rows.len();
    if n < 2 {
        return vec![0.0; width];
    }

    let ranges = attr_ranges(rows, width);
    let mut class_counts: Vec<(f64, usize)> = Vec::new();
    for &t in targets {
        match class_counts.iter_mut().find(|(class, _)| *class == t) {
            Some(entry) => entry.1 += 1,
            None => class_counts.push((t, 1)),
        }
    }

    let samples = sample_rows(n, iterations, seed);
    let m = samples.len() as f64;

    let deltas: Vec<Vec<f64>> = samples
        .par_iter()
        .map(|&i| {
            let mut delta = vec![0.0; width];
            let own_class = targets[i];
            let own_prior = class_counts
                .iter()
                .find(|(class, _)| *class == own_class)
                .map(|(_, count)| *count as f64 / n as f64)
                .unwrap_or(0.0);
            let ordered = neighbors_by_distance(rows, kinds, ranges.as_slice(), i);

            // ヒット: 同クラスのk近傍
            let hits: Vec<usize> = ordered
                .iter()
                .copied()
                .filter(|&j| targets[j] == own_class)
                .take(k)
                .collect();
            if !hits.is_empty() {
                let norm = m * hits.len() as f64;
                for &j in &hits {
                    for (a, &kind) in kinds.iter().enumerate() {
                        delta[a] -= attr_diff(kind, rows[i][a], rows[j][a], ranges[a]) / norm;
                    }
                }
            }

            // ミス: 他クラスごとのk近傍を事前確率で重み付け
            for &(class, count) in &class_counts {
                if class == own_class {
                    continue;
                }
                let misses: Vec<usize> = ordered
                    .iter()
                    .copied()
                    .filter(|&j| targets[j] == class)
                    .take(k)
                    .collect();
                if misses.is_empty() || own_prior >= 1.0 {
                    continue;
                }
                let prior = count as f64 / n as f64;
                let factor = prior / (1.0 - own_prior);
                let norm = m * misses.len() as f64;
                for &j in &misses {
                    for (a, &kind) in kinds.iter().enumerate() {
                        delta[a] +=
                            factor * attr_diff(kind, rows[i][a], rows[j][a], ranges[a]) / norm;
                    }
                }
            }
            delta
        })
        .collect();

    let mut weights = vec![0.0; width];
    for delta in deltas {
        for (a, d) in delta.into_iter().enumerate() {
            weights[a] += d;
        }
    }
    weights
}

/// RReliefF（連続ターゲット）による属性重み
///
/// サンプリングした各行のk近傍について、ターゲット差・属性差・
/// その同時差の期待値を蓄積し、条件付き確率の比として重みを組む。
pub fn rrelieff_weights(
    rows: &[Vec<f64>],
    kinds: &[VarKind],
    targets: &[f64],
    iterations: usize,
    k: usize,
    seed: u64,
) -> Vec<f64> {
    let width = kinds.len();
    let n = rows.len();
    if n < 2 {
        return vec![0.0; width];
    }

    let ranges = attr_ranges(rows, width);
    let t_lo = targets.iter().cloned().fold(f64::INFINITY, f64::min);
    let t_hi = targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let t_range = if t_hi > t_lo { t_hi - t_lo } else { 0.0 };

    let samples = sample_rows(n, iterations, seed);
    let m = samples.len() as f64;

    // (n_dc, n_da, n_dcda) のサンプルごとの寄与
    let parts: Vec<(f64, Vec<f64>, Vec<f64>)> = samples
        .par_iter()
        .map(|&i| {
            let ordered = neighbors_by_distance(rows, kinds, ranges.as_slice(), i);
            let neighbors: Vec<usize> = ordered.into_iter().take(k).collect();
            let mut n_dc = 0.0;
            let mut n_da = vec![0.0; width];
            let mut n_dcda = vec![0.0; width];
            if neighbors.is_empty() {
                return (n_dc, n_da, n_dcda);
            }
            let w = 1.0 / neighbors.len() as f64;
            for &j in &neighbors {
                let t_diff = if t_range > 0.0 {
                    ((targets[i] - targets[j]) / t_range).abs()
                } else {
                    0.0
                };
                n_dc += t_diff * w;
                for (a, &kind) in kinds.iter().enumerate() {
                    let a_diff = attr_diff(kind, rows[i][a], rows[j][a], ranges[a]);
                    n_da[a] += a_diff * w;
                    n_dcda[a] += t_diff * a_diff * w;
                }
            }
            (n_dc, n_da, n_dcda)
        })
        .collect();

    let mut n_dc = 0.0;
    let mut n_da = vec![0.0; width];
    let mut n_dcda = vec![0.0; width];
    for (dc, da, dcda) in parts {
        n_dc += dc;
        for a in 0..width {
            n_da[a] += da[a];
            n_dcda[a] += dcda[a];
        }
    }

    (0..width)
        .map(|a| {
            if n_dc <= 0.0 || m - n_dc <= 0.0 {
                0.0
            } else {
                n_dcda[a] / n_dc - (n_da[a] - n_dcda[a]) / (m - n_dc)
            }
        })
        .collect()
}

/// 重み降順（同値は名前昇順）の順序を返す
pub fn ranked_order(variables: &[Variable], weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..variables.len()).collect();
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| variables[a].name().cmp(variables[b].name()))
    });
    order
}
