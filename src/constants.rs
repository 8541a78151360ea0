// アルゴリズム定数

/// 射影評価に使うk近傍数（固定）
pub const SCORING_NEIGHBORS: usize = 3;

/// 交差検証の分割数（固定）
pub const CV_FOLDS: usize = 3;

/// 事前ランキング（ReliefF）のk近傍数
pub const PRERANK_NEIGHBORS: usize = 10;

/// 事前ランキングのサンプリング反復回数
pub const PRERANK_ITERATIONS: usize = 100;

/// 部分集合サイズの下限
pub const MIN_SUBSET_SIZE: usize = 3;

/// 部分集合サイズの上限
pub const MAX_SUBSET_SIZE: usize = 20;

/// 評価に最低限必要な有効行数
pub const MIN_VALID_ROWS: usize = 2;

/// スコア化できない状態に割り当てる最悪スコア（小さいほど良い規約）
pub const UNSCORABLE_SCORE: f64 = f64::INFINITY;
