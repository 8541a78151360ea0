// Radviz射影（純粋関数）

use std::f64::consts::PI;

/// 射影結果
///
/// `points`は入力と同じ行数で、無効行はNaN座標のまま残す。
/// `mask`が真の行だけが有限な埋め込みを持つ。
#[derive(Clone, Debug)]
pub struct Embedding {
    pub points: Vec<[f64; 2]>,
    pub mask: Vec<bool>,
}

impl Embedding {
    /// 有効な埋め込み行数
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}

/// 変数ごとのアンカー座標（単位円上に等間隔）
pub fn anchor_points(count: usize) -> Vec<[f64; 2]> {
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            [angle.cos(), angle.sin()]
        })
        .collect()
}

/// 列ごとに[0,1]へ正規化する。値域ゼロの列はNaNになる。
fn normalize_columns(rows: &[Vec<f64>], width: usize) -> Vec<Vec<f64>> {
    let mut lo = vec![f64::INFINITY; width];
    let mut hi = vec![f64::NEG_INFINITY; width];
    for row in rows {
        for (j, &v) in row.iter().enumerate() {
            if v.is_finite() {
                lo[j] = lo[j].min(v);
                hi[j] = hi[j].max(v);
            }
        }
    }
    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, &v)| (v - lo[j]) / (hi[j] - lo[j]))
                .collect()
        })
        .collect()
}

/// 行優先行列（rows × k、k ≥ 2）をRadviz射影する
///
/// 各列を[0,1]へ正規化し、各行をアンカーの重み付き平均として単位円内に
/// 配置する。正規化できない値を含む行と重み和が正でない行は無効になる。
pub fn project(rows: &[Vec<f64>]) -> Embedding {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let anchors = anchor_points(width);
    let normalized = normalize_columns(rows, width);

    let mut points = Vec::with_capacity(rows.len());
    let mut mask = Vec::with_capacity(rows.len());
    for row in &normalized {
        let finite = row.iter().all(|v| v.is_finite());
        let weight_sum: f64 = row.iter().sum();
        if !finite || weight_sum <= 0.0 {
            points.push([f64::NAN, f64::NAN]);
            mask.push(false);
            continue;
        }
        let mut x = 0.0;
        let mut y = 0.0;
        for (j, &w) in row.iter().enumerate() {
            x += w * anchors[j][0];
            y += w * anchors[j][1];
        }
        points.push([x / weight_sum, y / weight_sum]);
        mask.push(true);
    }

    Embedding { points, mask }
}
