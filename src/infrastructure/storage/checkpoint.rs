// チェックポイントの永続化

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::domain::search::SearchCheckpoint;

/// チェックポイントを保存・復元するためのtrait
///
/// エンジンは各ステップ後に保存するため、一時停止やクラッシュで
/// 失われるのは評価中の1状態だけになる。
pub trait CheckpointStore: Send {
    /// チェックポイントを保存する
    fn save(&mut self, checkpoint: &SearchCheckpoint) -> Result<()>;

    /// 保存済みチェックポイントを読み込む（なければNone）
    fn load(&self) -> Result<Option<SearchCheckpoint>>;

    /// 保存済みチェックポイントを破棄する
    fn clear(&mut self) -> Result<()>;
}

/// ファイルへのJSON保存実装
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&mut self, checkpoint: &SearchCheckpoint) -> Result<()> {
        let json = serde_json::to_string(checkpoint)?;
        fs::write(&self.path, json)
            .with_context(|| format!("チェックポイントを書き込めません: {}", self.path.display()))
    }

    fn load(&self) -> Result<Option<SearchCheckpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("チェックポイントを読み込めません: {}", self.path.display()))?;
        let checkpoint = serde_json::from_str(&json)
            .with_context(|| format!("チェックポイントを復元できません: {}", self.path.display()))?;
        Ok(Some(checkpoint))
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("チェックポイントを削除できません: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// メモリ内実装（既定・テスト用）
#[derive(Default)]
pub struct MemoryCheckpointStore {
    saved: Option<SearchCheckpoint>,
    save_count: u64,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存が呼ばれた回数
    pub fn save_count(&self) -> u64 {
        self.save_count
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&mut self, checkpoint: &SearchCheckpoint) -> Result<()> {
        self.saved = Some(checkpoint.clone());
        self.save_count += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<SearchCheckpoint>> {
        Ok(self.saved.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.saved = None;
        Ok(())
    }
}
