// ランキング探索のアプリケーション層

pub mod engine;
pub mod evaluator;
pub mod event;
pub mod leaderboard;

pub use engine::{EngineStatus, RankSearchEngine, StepOutcome};
pub use evaluator::ProjectionEvaluator;
pub use event::{RankEvent, RankProgress};
pub use leaderboard::{Leaderboard, RankedEntry, RankedResult};
