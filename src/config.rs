use crate::error::{CoffeeAiError, Result};
use coffee_ai_common::GeoLocation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// 端末位置の取得方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// 設定ファイル/コマンドラインの固定座標
    #[default]
    Fixed,
    /// IPアドレスから推定
    Ip,
    /// 端末位置を使わない
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPosition {
    pub lat: f64,
    pub lng: f64,
}

impl FixedPosition {
    pub fn to_location(self) -> GeoLocation {
        GeoLocation::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f32,
    /// 履歴ファイル（未指定ならデータディレクトリ）
    pub history_path: Option<PathBuf>,
    /// サムネイルの長辺(px)
    pub thumbnail_size: u32,
    pub locator: LocatorKind,
    pub device_location: Option<FixedPosition>,
    pub ip_locator_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            temperature: 0.1,
            history_path: None,
            thumbnail_size: 160,
            locator: LocatorKind::Fixed,
            device_location: None,
            ip_locator_url: "http://ip-api.com/json".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "設定を読み込みました");
            Ok(config.sanitized())
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// 範囲外の端末座標は捨てる
    fn sanitized(mut self) -> Self {
        if let Some(pos) = self.device_location {
            if !pos.to_location().is_valid() {
                tracing::warn!(lat = pos.lat, lng = pos.lng, "device_location が範囲外のため無視します");
                self.device_location = None;
            }
        }
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoffeeAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("coffee-ai").join("config.json"))
    }

    /// 履歴ファイルのパス
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_path {
            return Ok(path.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| CoffeeAiError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("coffee-ai").join("history.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(CoffeeAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_model(&mut self, model: String) -> Result<()> {
        self.model = model;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-2.5-flash", "locator": "ip"}"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.locator, LocatorKind::Ip);
        assert_eq!(config.thumbnail_size, 160);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_explicit_history_path() {
        let config = Config {
            history_path: Some(PathBuf::from("/tmp/h.json")),
            ..Default::default()
        };
        assert_eq!(config.history_path().unwrap(), PathBuf::from("/tmp/h.json"));
    }

    #[test]
    fn test_fixed_device_location_parse() {
        let config: Config =
            serde_json::from_str(r#"{"device_location": {"lat": 13.2, "lng": 75.1}}"#)
                .unwrap();
        assert_eq!(config.device_location, Some(FixedPosition { lat: 13.2, lng: 75.1 }));
    }

    #[test]
    fn test_out_of_range_device_location_dropped() {
        let config: Config =
            serde_json::from_str(r#"{"device_location": {"lat": 1e300, "lng": 0.0}}"#).unwrap();
        assert!(config.sanitized().device_location.is_none());

        let config: Config =
            serde_json::from_str(r#"{"device_location": {"lat": 13.2, "lng": 200.0}}"#).unwrap();
        assert!(config.sanitized().device_location.is_none());

        let config: Config =
            serde_json::from_str(r#"{"device_location": {"lat": -90.0, "lng": 180.0}}"#).unwrap();
        assert!(config.sanitized().device_location.is_some());
    }

    #[test]
    fn test_removed_limit_keys_are_ignored() {
        // 以前の設定ファイルに残っていても読み込める
        let config: Config = serde_json::from_str(
            r#"{"history_capacity": 0, "location_timeout_secs": 0, "model": "m"}"#,
        )
        .unwrap();
        assert_eq!(config.model, "m");
    }
}
