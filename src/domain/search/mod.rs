// 探索関連のドメインモデル

pub mod config;
pub mod enumerator;
pub mod error;
pub mod state;

pub use config::{RankConfig, SamplePercent, SubsetSize};
pub use enumerator::{total_states, StateEnumerator};
pub use error::{CheckpointMismatch, PreconditionError, UnscorableState};
pub use state::{ScoredState, SearchCheckpoint, SearchState};
