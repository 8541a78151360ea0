// 変数のドメインモデル

use serde::{Deserialize, Serialize};

/// 変数の種別
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// 離散（カテゴリ）変数
    Discrete,
    /// 連続（数値）変数
    Continuous,
}

/// データセットの1列を表す変数
///
/// 名前は結果表示の連結キーであり、同点スコアのタイブレークにも使う。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VarKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VarKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// 離散変数を作る
    pub fn discrete(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::Discrete)
    }

    /// 連続変数を作る
    pub fn continuous(name: impl Into<String>) -> Self {
        Self::new(name, VarKind::Continuous)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, VarKind::Discrete)
    }
}
