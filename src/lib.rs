// Radviz射影の変数部分集合ランキング - ライブラリモジュール

pub mod constants;
pub mod domain;         // ドメイン層
pub mod application;    // アプリケーション層
pub mod infrastructure; // インフラ層
pub mod logging;

// 外部クレートの再エクスポート
pub use anyhow::{anyhow, Context, Result};
pub use num_bigint::BigUint;

// 主要な型を再エクスポート
pub use application::vizrank::{
    EngineStatus, RankEvent, RankProgress, RankSearchEngine, RankedResult, StepOutcome,
};
pub use domain::data::{Dataset, VarKind, Variable};
pub use domain::search::{
    PreconditionError, RankConfig, SamplePercent, SearchCheckpoint, SubsetSize,
};
