// 2次元埋め込み上のk近傍予測

use std::cmp::Ordering;

/// 距離の2乗（2次元）
fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// queryに近い順に最大k個の訓練インデックスを返す（同距離はインデックス昇順）
fn nearest(train: &[[f64; 2]], query: [f64; 2], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..train.len()).collect();
    order.sort_by(|&i, &j| {
        dist2(train[i], query)
            .partial_cmp(&dist2(train[j], query))
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });
    order.truncate(k.min(train.len()));
    order
}

/// 多数決による分類。同票の場合はクラス値の小さい方を採る。
pub fn classify(train: &[[f64; 2]], labels: &[f64], query: [f64; 2], k: usize) -> f64 {
    let neighbors = nearest(train, query, k);
    let mut votes: Vec<(f64, usize)> = Vec::new();
    for &i in &neighbors {
        match votes.iter_mut().find(|(label, _)| *label == labels[i]) {
            Some(entry) => entry.1 += 1,
            None => votes.push((labels[i], 1)),
        }
    }
    votes.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
    });
    votes[0].0
}

/// 近傍平均による回帰
pub fn regress(train: &[[f64; 2]], values: &[f64], query: [f64; 2], k: usize) -> f64 {
    let neighbors = nearest(train, query, k);
    if neighbors.is_empty() {
        return f64::NAN;
    }
    neighbors.iter().map(|&i| values[i]).sum::<f64>() / neighbors.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_points(n: usize) -> Vec<[f64; 2]> {
        (0..n).map(|i| [i as f64, 0.0]).collect()
    }

    #[test]
    fn nearest_orders_by_distance() {
        let train = line_points(5);
        assert_eq!(nearest(&train, [3.1, 0.0], 3), vec![3, 4, 2]);
    }

    #[test]
    fn nearest_clamps_k_to_train_size() {
        let train = line_points(2);
        assert_eq!(nearest(&train, [0.0, 0.0], 5).len(), 2);
    }

    #[test]
    fn classify_takes_majority() {
        let train = line_points(5);
        let labels = vec![1.0, 1.0, 1.0, 0.0, 0.0];
        assert_eq!(classify(&train, &labels, [1.0, 0.0], 3), 1.0);
        assert_eq!(classify(&train, &labels, [4.0, 0.0], 3), 0.0);
    }

    #[test]
    fn classify_breaks_tie_with_smaller_label() {
        let train = vec![[0.0, 0.0], [1.0, 0.0]];
        let labels = vec![2.0, 1.0];
        assert_eq!(classify(&train, &labels, [0.5, 0.0], 2), 1.0);
    }

    #[test]
    fn regress_averages_neighbors() {
        let train = line_points(4);
        let values = vec![10.0, 20.0, 30.0, 40.0];
        let prediction = regress(&train, &values, [0.6, 0.0], 3);
        assert!((prediction - 20.0).abs() < 1e-12);
    }
}
