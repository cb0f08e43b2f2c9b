//! 診断結果の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - Diagnosis: AIモデルの出力（ヘルススコアなし）
//! - AnalysisResult: 最終出力（Diagnosis + ローカル計算のヘルススコア）
//! - HistoryRecord: 永続化される履歴レコード
//!
//! JSONのフィールド名はモデルのスキーマ契約に合わせてcamelCase

use serde::{Deserialize, Serialize};
use std::fmt;

/// 重症度（Healthy < Low < Moderate < Critical）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Healthy,
    Low,
    Moderate,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Healthy,
        Severity::Low,
        Severity::Moderate,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "Healthy",
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 作業の優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// リスク要因（各0-100）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    pub pest_risk: f64,
    pub disease_risk: f64,
    pub environmental_stress: f64,
    pub nutrient_deficiency: f64,
}

/// 7日間プランの1日分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub day: String,
    pub task: String,
    pub reason: String,
    pub priority: Priority,
}

/// モデルが返す診断（ヘルススコア計算前）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub diagnosis: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,

    pub plant_part: String,
    pub confidence: f64,
    pub severity: Severity,
    pub visual_indicators: Vec<String>,
    pub summary: String,
    pub immediate_actions: Vec<String>,
    pub preventative_measures: Vec<String>,
    pub risk_factors: RiskFactors,
    pub weekly_plan: Vec<DailyPlan>,
}

/// AI解析結果（ヘルススコア付き）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub diagnosis: Diagnosis,

    /// 0-100のヘルススコア
    pub health_score: u8,
}

impl AnalysisResult {
    /// モデル出力にヘルススコアを付与
    pub fn from_diagnosis(diagnosis: Diagnosis) -> Self {
        let health_score = crate::score::calculate_health_score(&diagnosis);
        Self {
            diagnosis,
            health_score,
        }
    }
}

/// 位置情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,

    /// 例: "Image Metadata", "Chikmagalur (Default)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            region_name: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region_name = Some(region.into());
        self
    }

    /// 緯度 -90..=90、経度 -180..=180 に収まるか（NaN・無限大は不可）
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// 履歴レコード（永続化対象）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub result: AnalysisResult,

    pub id: String,

    /// エポックミリ秒（EXIF撮影日時、なければ作成時刻）
    pub timestamp: i64,

    pub location: GeoLocation,

    /// サムネイル（Data URL）
    pub thumbnail: String,
}

impl HistoryRecord {
    pub fn health_score(&self) -> u8 {
        self.result.health_score
    }
}
