//! EXIFタグから位置・撮影日時を取り出す

use chrono::{Duration, NaiveDate};
use coffee_ai_common::GeoLocation;
use exif::{Exif, In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 画像から取り出したメタデータ（どちらも無い場合あり）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    pub location: Option<GeoLocation>,
    /// エポックミリ秒
    pub timestamp: Option<i64>,
}

impl ImageMetadata {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.timestamp.is_none()
    }
}

/// 撮影日時タグの優先順（撮影時 → 生成時 → 汎用）とそのタイムゾーンタグ
const DATE_TAGS: &[(Tag, Tag)] = &[
    (Tag::DateTimeOriginal, Tag::OffsetTimeOriginal),
    (Tag::DateTimeDigitized, Tag::OffsetTimeDigitized),
    (Tag::DateTime, Tag::OffsetTime),
];

pub fn read_exif(path: &Path) -> Result<Exif, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    Ok(exif_reader.read_from_container(&mut bufreader)?)
}

pub fn metadata_from_exif(exif: &Exif) -> ImageMetadata {
    let lat = gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S');
    let lng = gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W');

    let location = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoLocation::new(lat, lng)).filter(GeoLocation::is_valid),
        _ => None,
    };

    ImageMetadata {
        location,
        timestamp: capture_timestamp(exif),
    }
}

/// 度分秒の有理数3つ（または度のみ）を10進度に変換し、南/西なら負にする
fn gps_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let parts = match &field.value {
        Value::Rational(v) if !v.is_empty() => v,
        _ => return None,
    };

    let degrees = parts
        .iter()
        .take(3)
        .zip([1.0, 60.0, 3600.0])
        .map(|(r, div)| r.to_f64() / div)
        .sum::<f64>();

    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(v) => v.first().and_then(|s| s.first()).copied(),
            _ => None,
        })
        .map(|c| c.eq_ignore_ascii_case(&negative_ref))
        .unwrap_or(false);

    Some(if negative { -degrees } else { degrees })
}

fn capture_timestamp(exif: &Exif) -> Option<i64> {
    DATE_TAGS
        .iter()
        .find_map(|&(date_tag, offset_tag)| parse_date_field(exif, date_tag, offset_tag))
}

fn first_ascii(exif: &Exif, tag: Tag) -> Option<&[u8]> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(v) => v.first().map(|s| s.as_slice()),
        _ => None,
    }
}

/// "YYYY:MM:DD HH:MM:SS" をエポックミリ秒へ（タイムゾーン無しはUTC扱い）
fn parse_date_field(exif: &Exif, date_tag: Tag, offset_tag: Tag) -> Option<i64> {
    let ascii = first_ascii(exif, date_tag)?;
    let mut dt = exif::DateTime::from_ascii(ascii).ok()?;
    if let Some(offset) = first_ascii(exif, offset_tag) {
        // 不正なオフセットは無視してUTC扱い
        let _ = dt.parse_offset(offset);
    }

    let naive = NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(u32::from(dt.hour), u32::from(dt.minute), u32::from(dt.second))?;
    let utc = naive - Duration::minutes(i64::from(dt.offset.unwrap_or(0)));

    Some(utc.and_utc().timestamp_millis())
}
