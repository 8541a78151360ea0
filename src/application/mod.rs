// アプリケーション層

pub mod progress;
pub mod vizrank;
