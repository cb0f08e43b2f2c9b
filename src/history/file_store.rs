//! JSONファイル1つを保存先とする履歴ストア
//!
//! ファイルには新しい順のレコード配列をそのまま書く。追記のたびに丸ごと上書きする

use super::{prepend_bounded, HistoryStore};
use crate::error::{CoffeeAiError, Result};
use coffee_ai_common::HistoryRecord;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 一時ファイルに書いてから置き換える
    fn write_all(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, records)?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileStore {
    fn append(&mut self, record: HistoryRecord) -> Result<()> {
        let history = self.list()?;
        let updated = prepend_bounded(history, record);
        self.write_all(&updated)
            .map_err(|e| CoffeeAiError::Storage(format!("{}: {}", self.path.display(), e)))
    }

    fn list(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| CoffeeAiError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}
