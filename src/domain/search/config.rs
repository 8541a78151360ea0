// 探索設定のValue Objects

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SUBSET_SIZE, MIN_SUBSET_SIZE};

/// 部分集合の最大サイズを表すValue Object
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubsetSize(usize);

impl SubsetSize {
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_SUBSET_SIZE {
            return Err(anyhow!(
                "部分集合サイズは{}以上である必要があります: {}",
                MIN_SUBSET_SIZE,
                size
            ));
        }
        if size > MAX_SUBSET_SIZE {
            return Err(anyhow!("部分集合サイズが大きすぎます: {}", size));
        }
        Ok(Self(size))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    pub fn min() -> Self {
        Self(MIN_SUBSET_SIZE)
    }
}

/// 評価に使うデータ行の割合を表すValue Object（パーセント）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePercent(u8);

impl SamplePercent {
    pub fn new(percent: u8) -> Result<Self> {
        if !(1..=100).contains(&percent) {
            return Err(anyhow!("サンプル割合は1~100の範囲: {}", percent));
        }
        Ok(Self(percent))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// 全データを使う（既定値）
    pub fn full() -> Self {
        Self(100)
    }

    pub fn is_full(&self) -> bool {
        self.0 == 100
    }
}

/// ランキング探索の設定
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankConfig {
    pub max_subset_size: SubsetSize,
    pub sample_percent: SamplePercent,
    /// サンプリングのシード（サブサンプリングと事前ランキングで共有）
    pub sample_seed: u64,
}

impl RankConfig {
    pub fn validate(&self) -> Result<()> {
        // Value Objectsで既に検証済み
        Ok(())
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            max_subset_size: SubsetSize::min(),
            sample_percent: SamplePercent::full(),
            sample_seed: 0,
        }
    }
}
