//! 診断履歴
//!
//! 追記と一覧だけを持つストア抽象。新しい順に最大50件を保持し、
//! 溢れた分は古いものから捨てる（挿入順FIFO）。更新・削除は無い

mod file_store;
mod thumbnail;

pub use file_store::JsonFileStore;
pub use thumbnail::make_thumbnail;

use crate::error::Result;
use coffee_ai_common::{AnalysisResult, GeoLocation, HistoryRecord};
use sha2::{Digest, Sha256};

/// 保持件数の上限
pub const HISTORY_CAPACITY: usize = 50;

/// 履歴ストア
pub trait HistoryStore {
    /// 先頭に追加し、上限を超えた古いものを捨てて保存
    fn append(&mut self, record: HistoryRecord) -> Result<()>;

    /// 新しい順の全件（未保存なら空）
    fn list(&self) -> Result<Vec<HistoryRecord>>;
}

/// 先頭に追加して上限で切り詰める
pub(crate) fn prepend_bounded(mut history: Vec<HistoryRecord>, record: HistoryRecord) -> Vec<HistoryRecord> {
    history.insert(0, record);
    history.truncate(HISTORY_CAPACITY);
    history
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<HistoryRecord>,
}

impl HistoryStore for MemoryStore {
    fn append(&mut self, record: HistoryRecord) -> Result<()> {
        let records = std::mem::take(&mut self.records);
        self.records = prepend_bounded(records, record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryRecord>> {
        Ok(self.records.clone())
    }
}

/// 9桁のレコードIDを生成（作成時刻と画像のハッシュ）
pub fn generate_id(created_at_nanos: i64, image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(created_at_nanos.to_le_bytes());
    hasher.update(image);
    let mut id = hex::encode(hasher.finalize());
    id.truncate(9);
    id
}

/// 履歴レコードを作成
///
/// `captured_at` は EXIF の撮影日時。無ければ作成時刻を使う
pub fn new_record(
    result: AnalysisResult,
    location: GeoLocation,
    image: &[u8],
    thumbnail: String,
    captured_at: Option<i64>,
) -> HistoryRecord {
    let now = chrono::Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_millis());

    HistoryRecord {
        result,
        id: generate_id(nanos, image),
        timestamp: captured_at.unwrap_or_else(|| now.timestamp_millis()),
        location,
        thumbnail,
    }
}
