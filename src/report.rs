//! 結果の表示用テキストと地図データ
//!
//! ダッシュボード・履歴一覧・地図サマリの整形と GeoJSON 書き出し

use coffee_ai_common::grid::{bucket_records, clamp_days, filter_recent, map_center};
use coffee_ai_common::{GridCell, HealthBand, HistoryRecord, LocationSource};
use serde_json::{json, Value};
use std::fmt::Write as _;

/// リスクバーの幅（文字数）
const BAR_WIDTH: usize = 20;

fn format_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn band_label(band: HealthBand) -> &'static str {
    match band {
        HealthBand::Green => "良好",
        HealthBand::Yellow => "注意",
        HealthBand::Orange => "警戒",
        HealthBand::Red => "危険",
    }
}

fn risk_bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn source_label(source: LocationSource) -> &'static str {
    match source {
        LocationSource::ImageTags => "画像タグ",
        LocationSource::Device => "端末位置",
        LocationSource::Default => "既定座標",
    }
}

/// 診断結果ダッシュボード
pub fn format_dashboard(record: &HistoryRecord, location_source: LocationSource) -> String {
    let d = &record.result.diagnosis;
    let score = record.health_score();
    let mut out = String::new();

    let _ = writeln!(out, "🌿 {}", d.diagnosis);
    if let Some(name) = &d.scientific_name {
        let _ = writeln!(out, "   {}", name);
    }
    let _ = writeln!(out, "部位: {}  確信度: {:.0}%  重症度: {}", d.plant_part, d.confidence, d.severity);
    let _ = writeln!(
        out,
        "ヘルススコア: {}/100 ({})",
        score,
        band_label(HealthBand::from_score(f64::from(score)))
    );

    let _ = writeln!(out, "\n概要:\n  {}", d.summary);

    if !d.visual_indicators.is_empty() {
        let _ = writeln!(out, "\n所見:");
        for item in &d.visual_indicators {
            let _ = writeln!(out, "  - {}", item);
        }
    }

    let _ = writeln!(out, "\nリスク:");
    let risks = &d.risk_factors;
    for (label, value) in [
        ("病害", risks.disease_risk),
        ("害虫", risks.pest_risk),
        ("栄養", risks.nutrient_deficiency),
        ("環境", risks.environmental_stress),
    ] {
        let _ = writeln!(out, "  {} {} {:>3.0}", label, risk_bar(value), value);
    }

    let _ = writeln!(out, "\n緊急対応:");
    for (i, action) in d.immediate_actions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, action);
    }

    let _ = writeln!(out, "\n予防策:");
    for measure in &d.preventative_measures {
        let _ = writeln!(out, "  - {}", measure);
    }

    if !d.weekly_plan.is_empty() {
        let _ = writeln!(out, "\n7日間プラン:");
        for day in &d.weekly_plan {
            let _ = writeln!(out, "  [{}] {:<6} {} ({})", day.priority, day.day, day.task, day.reason);
        }
    }

    let loc = &record.location;
    let _ = writeln!(
        out,
        "\n📍 {:.4}, {:.4} {} [{}]",
        loc.lat,
        loc.lng,
        loc.region_name.as_deref().unwrap_or(""),
        source_label(location_source)
    );
    let _ = write!(out, "🕒 {}  ID: {}", format_date(record.timestamp), record.id);

    out
}

/// 履歴一覧（新しい順、`limit` 件まで）
pub fn format_history(records: &[HistoryRecord], limit: Option<usize>) -> String {
    if records.is_empty() {
        return "履歴はありません".to_string();
    }

    let shown = limit.unwrap_or(records.len()).min(records.len());
    let mut out = String::new();
    for record in &records[..shown] {
        let _ = writeln!(
            out,
            "{}  {}  {:>3}  {:<8}  {}",
            record.id,
            format_date(record.timestamp),
            record.health_score(),
            record.result.diagnosis.severity,
            record.result.diagnosis.diagnosis
        );
    }
    let _ = write!(out, "{}/{}件を表示", shown, records.len());
    out
}

/// 地図表示用に抽出・集計したデータ
#[derive(Debug, Clone)]
pub struct MapView<'a> {
    pub days: u32,
    pub center: (f64, f64),
    pub points: Vec<&'a HistoryRecord>,
    pub cells: Vec<GridCell>,
}

impl<'a> MapView<'a> {
    pub fn build(records: &'a [HistoryRecord], days: u32, now_ms: i64) -> Self {
        let days = clamp_days(days);
        let points = filter_recent(records, days, now_ms);
        let cells = bucket_records(&points);
        Self {
            days,
            center: map_center(&points),
            points,
            cells,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "🗺  直近{}日: {}件 / {}セル  中心 {:.4}, {:.4}",
            self.days,
            self.sample_count(),
            self.cells.len(),
            self.center.0,
            self.center.1
        );
        for cell in &self.cells {
            let _ = writeln!(
                out,
                "  [{:.2}, {:.2}]-[{:.2}, {:.2}]  平均 {:>5.1} ({})  {}件",
                cell.bounds[0][0],
                cell.bounds[0][1],
                cell.bounds[1][0],
                cell.bounds[1][1],
                cell.avg_score,
                band_label(cell.band()),
                cell.count
            );
        }
        out.trim_end().to_string()
    }

    /// セルをポリゴン、レコードを点とする FeatureCollection
    pub fn to_geojson(&self) -> Value {
        let cells = self.cells.iter().map(|cell| {
            let [[south, west], [north, east]] = cell.bounds;
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [west, south], [east, south], [east, north], [west, north], [west, south]
                    ]]
                },
                "properties": {
                    "kind": "cell",
                    "avgScore": cell.avg_score,
                    "count": cell.count,
                    "color": cell.band().hex(),
                }
            })
        });

        let points = self.points.iter().map(|record| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [record.location.lng, record.location.lat]
                },
                "properties": {
                    "kind": "record",
                    "id": record.id,
                    "diagnosis": record.result.diagnosis.diagnosis,
                    "severity": record.result.diagnosis.severity,
                    "healthScore": record.health_score(),
                    "date": format_date(record.timestamp),
                    "color": HealthBand::from_score(f64::from(record.health_score())).hex(),
                }
            })
        });

        json!({
            "type": "FeatureCollection",
            "features": cells.chain(points).collect::<Vec<_>>(),
        })
    }
}
