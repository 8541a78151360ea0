// スコアリングのドメインモデル

pub mod cross_validation;
pub mod knn;
pub mod relief;

pub use cross_validation::cross_validate;
pub use relief::{ranked_order, relieff_weights, rrelieff_weights};
