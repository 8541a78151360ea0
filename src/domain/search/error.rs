// 探索エラーの定義

use thiserror::Error;

/// 実行前提条件の違反
///
/// モジュール境界を越えて呼び出し側へ通知される唯一の失敗。
/// 実行は開始されず、入力を直してから再試行できる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("候補変数が不足しています（{found}個、最低{min}個必要）")]
    TooFewVariables { found: usize, min: usize },

    #[error("有効なデータ行が不足しています（{found}行、最低{min}行必要）")]
    TooFewRows { found: usize, min: usize },

    #[error("ターゲット変数がすべて欠損しています")]
    TargetAllMissing,

    #[error("ターゲット変数に分散がありません")]
    TargetConstant,

    #[error("変数がデータセットに存在しません: {name}")]
    UnknownVariable { name: String },

    #[error("部分集合サイズが範囲外です（{size}、許容範囲 {min}..={max}）")]
    SizeOutOfRange {
        size: usize,
        min: usize,
        max: usize,
    },

    #[error("エンジンが初期化されていません")]
    NotInitialized,

    #[error("探索の実行中は操作できません")]
    RunActive,
}

/// 単一状態が評価不能（内部で最悪スコアに吸収され、実行は継続する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnscorableState {
    #[error("射影に有効な行がありません")]
    EmptyEmbedding,

    #[error("評価に必要な行数が不足しています")]
    TooFewRows,
}

/// チェックポイントが現在の探索条件と一致しない
///
/// 破棄して最初から再開始することで回復する。呼び出し側には出ない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointMismatch {
    #[error("候補変数の順序が一致しません")]
    OrderChanged,

    #[error("最大部分集合サイズが一致しません（保存時 {saved}、現在 {current}）")]
    SizeChanged { saved: usize, current: usize },

    #[error("保存された状態が復元できません")]
    BadState,
}
