//! 地域ヘルスマップの集計
//!
//! 履歴レコードを 0.01° 四方のグリッドに振り分け、
//! セルごとにヘルススコアの平均を求める。描画のたびに再計算する

use crate::location::DEFAULT_LOCATION;
use crate::types::{GeoLocation, HistoryRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// グリッドサイズ（度）。約1.1km
pub const GRID_SIZE: f64 = 0.01;

/// 1日のミリ秒
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 期間スライダーの範囲（日）
pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 90;
pub const DEFAULT_DAYS: u32 = 30;

/// 集計済みグリッドセル
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub lat_key: i64,
    pub lng_key: i64,
    /// [[南, 西], [北, 東]]
    pub bounds: [[f64; 2]; 2],
    pub avg_score: f64,
    pub count: usize,
}

impl GridCell {
    pub fn band(&self) -> HealthBand {
        HealthBand::from_score(self.avg_score)
    }
}

/// ヘルススコアの色帯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    Green,
    Yellow,
    Orange,
    Red,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthBand::Green
        } else if score >= 50.0 {
            HealthBand::Yellow
        } else if score >= 25.0 {
            HealthBand::Orange
        } else {
            HealthBand::Red
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            HealthBand::Green => "#22c55e",
            HealthBand::Yellow => "#eab308",
            HealthBand::Orange => "#f97316",
            HealthBand::Red => "#ef4444",
        }
    }
}

/// グリッドキー（floor(座標 / GRID_SIZE)）
pub fn grid_key(location: &GeoLocation) -> (i64, i64) {
    (
        (location.lat / GRID_SIZE).floor() as i64,
        (location.lng / GRID_SIZE).floor() as i64,
    )
}

/// 期間の下限（エポックミリ秒）
pub fn cutoff_ms(now_ms: i64, days: u32) -> i64 {
    now_ms - i64::from(days) * DAY_MS
}

/// 直近 `days` 日のレコードを抽出（境界を含む）
pub fn filter_recent(records: &[HistoryRecord], days: u32, now_ms: i64) -> Vec<&HistoryRecord> {
    let cutoff = cutoff_ms(now_ms, days);
    records.iter().filter(|r| r.timestamp >= cutoff).collect()
}

/// 抽出済みレコードをグリッドに集計
pub fn bucket_records(records: &[&HistoryRecord]) -> Vec<GridCell> {
    let mut grids: BTreeMap<(i64, i64), (f64, usize)> = BTreeMap::new();

    for record in records {
        let entry = grids.entry(grid_key(&record.location)).or_insert((0.0, 0));
        entry.0 += f64::from(record.health_score());
        entry.1 += 1;
    }

    grids
        .into_iter()
        .map(|((lat_key, lng_key), (total, count))| GridCell {
            lat_key,
            lng_key,
            bounds: [
                [lat_key as f64 * GRID_SIZE, lng_key as f64 * GRID_SIZE],
                [(lat_key as f64 + 1.0) * GRID_SIZE, (lng_key as f64 + 1.0) * GRID_SIZE],
            ],
            avg_score: total / count as f64,
            count,
        })
        .collect()
}

/// 期間フィルタ + グリッド集計
pub fn aggregate_grid(records: &[HistoryRecord], days: u32, now_ms: i64) -> Vec<GridCell> {
    bucket_records(&filter_recent(records, days, now_ms))
}

/// 地図の中心（最新のレコード、なければデフォルト座標）
pub fn map_center(filtered: &[&HistoryRecord]) -> (f64, f64) {
    filtered
        .first()
        .map(|r| (r.location.lat, r.location.lng))
        .unwrap_or((DEFAULT_LOCATION.0, DEFAULT_LOCATION.1))
}

/// 日数を 1..=90 に収める
pub fn clamp_days(days: u32) -> u32 {
    days.clamp(MIN_DAYS, MAX_DAYS)
}
