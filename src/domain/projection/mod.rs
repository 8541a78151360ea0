// 射影のドメインモデル

pub mod radviz;

pub use radviz::{anchor_points, project, Embedding};
