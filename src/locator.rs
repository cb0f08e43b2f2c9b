//! 端末位置の取得とフォールバック
//!
//! 画像タグに位置が無いときだけ端末位置を1回問い合わせる（タイムアウト付き、キャッシュなし）。
//! 失敗しても既定座標にフォールバックするので、呼び出し側には必ず位置が返る

use crate::config::{Config, FixedPosition, LocatorKind};
use crate::error::{CoffeeAiError, Result};
use coffee_ai_common::location::{resolve_location, CaptureSource, LocationSource};
use coffee_ai_common::GeoLocation;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// 端末位置の問い合わせを打ち切るまでの時間
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(5);

/// 端末位置の取得手段
pub trait DeviceLocator {
    fn current_position(&self) -> impl Future<Output = Result<GeoLocation>> + Send;
}

/// 設定ファイル/コマンドラインで与えた固定座標
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    position: Option<GeoLocation>,
}

impl FixedLocator {
    pub fn new(position: Option<GeoLocation>) -> Self {
        Self { position }
    }
}

impl DeviceLocator for FixedLocator {
    async fn current_position(&self) -> Result<GeoLocation> {
        self.position
            .clone()
            .ok_or_else(|| CoffeeAiError::Location("端末位置が設定されていません".into()))
    }
}

/// IPアドレスからの位置推定（ip-api.com 互換のJSON）
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl DeviceLocator for IpLocator {
    async fn current_position(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CoffeeAiError::Location(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CoffeeAiError::Location(format!("status {}", response.status())));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| CoffeeAiError::Location(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                let loc = GeoLocation::new(lat, lon);
                Ok(match body.city {
                    Some(city) => loc.with_region(city),
                    None => loc,
                })
            }
            _ => Err(CoffeeAiError::Location(format!("lookup failed: {}", body.status))),
        }
    }
}

/// 設定から選ばれる位置取得手段
#[derive(Debug, Clone)]
pub enum Locator {
    Fixed(FixedLocator),
    Ip(IpLocator),
    Disabled,
}

impl Locator {
    /// `position` はコマンドライン指定（設定ファイルより優先）
    pub fn from_config(config: &Config, position: Option<GeoLocation>) -> Self {
        if position.is_some() {
            return Locator::Fixed(FixedLocator::new(position));
        }
        match config.locator {
            LocatorKind::Fixed => Locator::Fixed(FixedLocator::new(
                config.device_location.map(FixedPosition::to_location),
            )),
            LocatorKind::Ip => Locator::Ip(IpLocator::new(config.ip_locator_url.clone())),
            LocatorKind::None => Locator::Disabled,
        }
    }
}

impl DeviceLocator for Locator {
    async fn current_position(&self) -> Result<GeoLocation> {
        match self {
            Locator::Fixed(l) => l.current_position().await,
            Locator::Ip(l) => l.current_position().await,
            Locator::Disabled => Err(CoffeeAiError::Location("端末位置は無効です".into())),
        }
    }
}

/// 端末位置を1回問い合わせる。失敗・タイムアウトは None
pub async fn query_device<L: DeviceLocator>(locator: &L, timeout: Duration) -> Option<GeoLocation> {
    match tokio::time::timeout(timeout, locator.current_position()).await {
        Ok(Ok(loc)) => Some(loc),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "端末位置を取得できませんでした");
            None
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "端末位置の取得がタイムアウトしました");
            None
        }
    }
}

/// タグ → 端末 → 既定座標 の順で位置を決める
pub async fn locate<L: DeviceLocator>(
    tag: Option<GeoLocation>,
    source: CaptureSource,
    locator: &L,
    timeout: Duration,
) -> (GeoLocation, LocationSource) {
    let tag = tag.filter(GeoLocation::is_valid);
    if tag.is_some() {
        return resolve_location(tag, source, None);
    }

    tracing::debug!("画像に位置情報が無いため端末位置を使用します");
    let device = query_device(locator, timeout).await;
    resolve_location(None, source, device)
}
