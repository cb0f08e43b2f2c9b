//! 位置情報のフォールバック方針
//!
//! 画像タグ → 端末位置 → 既定座標（チクマガルール中心）の順に解決する。
//! どの経路でも必ず何らかの位置を返す

use crate::types::GeoLocation;
use serde::{Deserialize, Serialize};

/// 既定座標（チクマガルール中心）
pub const DEFAULT_LOCATION: (f64, f64) = (13.3153, 75.7754);

pub const DEFAULT_REGION: &str = "Chikmagalur (Default)";
pub const IMAGE_METADATA_REGION: &str = "Image Metadata";
pub const DEVICE_LIVE_REGION: &str = "Device GPS (Live)";
pub const DEVICE_MISSING_LOC_REGION: &str = "Device (Image missing loc)";

/// 画像の取得経路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureSource {
    /// その場で撮影（タグ抽出は行わない）
    Camera,
    /// ファイルからアップロード
    Upload,
}

/// 解決された位置の出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    ImageTags,
    Device,
    Default,
}

pub fn default_location() -> GeoLocation {
    GeoLocation::new(DEFAULT_LOCATION.0, DEFAULT_LOCATION.1).with_region(DEFAULT_REGION)
}

/// 端末位置に付けるラベル
pub fn device_region_label(source: CaptureSource) -> &'static str {
    match source {
        CaptureSource::Camera => DEVICE_LIVE_REGION,
        CaptureSource::Upload => DEVICE_MISSING_LOC_REGION,
    }
}

/// 位置を解決
///
/// `tag` が有効ならそれを採用し、なければ `device` にラベルを付けて採用、
/// どちらもなければ既定座標を返す。範囲外の座標は無いものとして扱う
pub fn resolve_location(
    tag: Option<GeoLocation>,
    source: CaptureSource,
    device: Option<GeoLocation>,
) -> (GeoLocation, LocationSource) {
    if let Some(loc) = tag.filter(GeoLocation::is_valid) {
        let loc = GeoLocation::new(loc.lat, loc.lng).with_region(IMAGE_METADATA_REGION);
        return (loc, LocationSource::ImageTags);
    }

    if let Some(loc) = device.filter(GeoLocation::is_valid) {
        let loc = GeoLocation::new(loc.lat, loc.lng).with_region(device_region_label(source));
        return (loc, LocationSource::Device);
    }

    (default_location(), LocationSource::Default)
}
