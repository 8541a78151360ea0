// 永続化

pub mod checkpoint;

pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
