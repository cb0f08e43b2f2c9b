//! 1枚の画像の解析パイプライン
//!
//! 読み込み/エンコード → タグ抽出（アップロード時のみ）→ 端末位置 → 診断 → 履歴保存。
//! 一度に1件ずつ順番に実行する。診断が失敗したら部分結果は残さない

use crate::analyzer::{encode_image, Diagnoser};
use crate::config::Config;
use crate::error::Result;
use crate::history::{make_thumbnail, new_record, HistoryStore};
use crate::locator::{locate, DeviceLocator, LOCATION_TIMEOUT};
use crate::scanner::{self, ImageMetadata};
use coffee_ai_common::{CaptureSource, HistoryRecord, LocationSource, Session};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub source: CaptureSource,
    /// false なら履歴に保存しない
    pub save: bool,
    pub thumbnail_size: u32,
    pub location_timeout: Duration,
}

impl AnalyzeOptions {
    pub fn from_config(config: &Config, source: CaptureSource, save: bool) -> Self {
        Self {
            source,
            save,
            thumbnail_size: config.thumbnail_size,
            location_timeout: LOCATION_TIMEOUT,
        }
    }
}

/// 解析結果
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: HistoryRecord,
    pub location_source: LocationSource,
    pub saved: bool,
    /// 保存に失敗したときの警告
    pub warning: Option<String>,
}

/// 画像を解析して履歴に追加
///
/// `session` は HOME から始まり、成功で RESULT、失敗で HOME（エラー付き）になる
pub async fn analyze_image<D, L, S>(
    session: &mut Session,
    path: &Path,
    options: &AnalyzeOptions,
    diagnoser: &D,
    locator: &L,
    store: &mut S,
) -> Result<AnalysisOutcome>
where
    D: Diagnoser,
    L: DeviceLocator,
    S: HistoryStore,
{
    session.select_image()?;

    match run(session, path, options, diagnoser, locator).await {
        Ok((record, location_source)) => {
            session.succeed(record.result.clone())?;
            let (saved, warning) = if options.save {
                persist(store, &record)
            } else {
                (false, None)
            };
            Ok(AnalysisOutcome {
                record,
                location_source,
                saved,
                warning,
            })
        }
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "解析に失敗しました");
            session.fail()?;
            Err(e)
        }
    }
}

async fn run<D, L>(
    session: &mut Session,
    path: &Path,
    options: &AnalyzeOptions,
    diagnoser: &D,
    locator: &L,
) -> Result<(HistoryRecord, LocationSource)>
where
    D: Diagnoser,
    L: DeviceLocator,
{
    let (image, bytes) = encode_image(path)?;

    // その場で撮影した画像はタグを読まない
    let metadata = match options.source {
        CaptureSource::Upload => scanner::extract_metadata(path),
        CaptureSource::Camera => ImageMetadata::default(),
    };

    let (location, location_source) =
        locate(metadata.location, options.source, locator, options.location_timeout).await;
    tracing::info!(
        lat = location.lat,
        lng = location.lng,
        source = ?location_source,
        "位置を決定しました"
    );
    session.set_location(location.clone());

    let result = diagnoser.diagnose(&image).await?;
    tracing::info!(
        diagnosis = %result.diagnosis.diagnosis,
        score = result.health_score,
        "診断が完了しました"
    );

    let thumbnail = match make_thumbnail(&bytes, options.thumbnail_size) {
        Ok(thumb) => thumb,
        Err(e) => {
            tracing::debug!(error = %e, "サムネイルを作れないため元画像を保存します");
            image.to_data_url()
        }
    };

    let record = new_record(result, location, &bytes, thumbnail, metadata.timestamp);
    Ok((record, location_source))
}

/// 保存に失敗しても結果は返す
fn persist<S: HistoryStore>(store: &mut S, record: &HistoryRecord) -> (bool, Option<String>) {
    match store.append(record.clone()) {
        Ok(()) => {
            tracing::debug!(id = %record.id, "履歴に保存しました");
            (true, None)
        }
        Err(e) => {
            tracing::warn!(id = %record.id, error = %e, "履歴を保存できませんでした");
            (false, Some(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::EncodedImage;
    use crate::error::CoffeeAiError;
    use crate::history::tests::sample_result;
    use crate::history::MemoryStore;
    use crate::locator::FixedLocator;
    use crate::scanner::exif::tests::{build_tiff, gps_fields};
    use coffee_ai_common::location::{
        DEVICE_LIVE_REGION, DEVICE_MISSING_LOC_REGION, IMAGE_METADATA_REGION,
    };
    use coffee_ai_common::{AnalysisResult, GeoLocation, View, ANALYSIS_FAILED_MESSAGE};
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct FakeDiagnoser {
        fail: bool,
    }

    impl Diagnoser for FakeDiagnoser {
        async fn diagnose(&self, image: &EncodedImage) -> Result<AnalysisResult> {
            assert!(!image.data.is_empty());
            if self.fail {
                Err(CoffeeAiError::ApiCall("offline".into()))
            } else {
                Ok(sample_result("Nitrogen Deficiency"))
            }
        }
    }

    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn append(&mut self, _record: HistoryRecord) -> Result<()> {
            Err(CoffeeAiError::Storage("quota exceeded".into()))
        }

        fn list(&self) -> Result<Vec<HistoryRecord>> {
            Ok(Vec::new())
        }
    }

    fn options(source: CaptureSource) -> AnalyzeOptions {
        AnalyzeOptions {
            source,
            save: true,
            thumbnail_size: 160,
            location_timeout: Duration::from_secs(5),
        }
    }

    fn leaf_image() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        image::RgbImage::from_pixel(32, 16, image::Rgb([40, 140, 50]))
            .save(&path)
            .unwrap();
        (dir, path)
    }

    fn device() -> FixedLocator {
        FixedLocator::new(Some(GeoLocation::new(12.97, 77.59)))
    }

    #[tokio::test]
    async fn test_success_saves_record() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let outcome = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await
        .unwrap();

        assert!(outcome.saved);
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.location_source, LocationSource::Device);
        assert_eq!(
            outcome.record.location.region_name.as_deref(),
            Some(DEVICE_MISSING_LOC_REGION)
        );
        assert!(outcome.record.thumbnail.starts_with("data:image/jpeg;base64,"));

        assert_eq!(session.view(), View::Result);
        assert_eq!(
            session.result().map(|r| r.health_score),
            Some(outcome.record.health_score())
        );
        assert!(session.current_location().is_some());

        let saved = store.list().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, outcome.record.id);
    }

    #[tokio::test]
    async fn test_tagged_upload_uses_image_location_and_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagged.tif");
        std::fs::write(&path, build_tiff(&gps_fields())).unwrap();
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let outcome = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await
        .unwrap();

        assert_eq!(outcome.location_source, LocationSource::ImageTags);
        let location = &outcome.record.location;
        assert_eq!(location.region_name.as_deref(), Some(IMAGE_METADATA_REGION));
        assert!((location.lat - 13.3153).abs() < 1e-4);
        assert!((location.lng - 75.7754).abs() < 1e-4);
        // 2025-06-01T08:30:00Z
        assert_eq!(outcome.record.timestamp, 1_748_766_600_000);
        assert_eq!(store.list().unwrap()[0].timestamp, 1_748_766_600_000);
    }

    #[test]
    fn test_options_use_fixed_location_timeout() {
        let options = AnalyzeOptions::from_config(&Config::default(), CaptureSource::Camera, false);
        assert_eq!(options.location_timeout, Duration::from_secs(5));
        assert_eq!(options.location_timeout, LOCATION_TIMEOUT);
        assert!(!options.save);
    }

    #[tokio::test]
    async fn test_camera_capture_labels_live_device() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let outcome = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Camera),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await
        .unwrap();

        assert_eq!(outcome.record.location.region_name.as_deref(), Some(DEVICE_LIVE_REGION));
    }

    #[tokio::test]
    async fn test_failure_returns_home_with_error() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let result = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: true },
            &device(),
            &mut store,
        )
        .await;

        assert!(matches!(result, Err(CoffeeAiError::ApiCall(_))));
        assert_eq!(session.view(), View::Home);
        assert_eq!(session.error(), Some(ANALYSIS_FAILED_MESSAGE));
        assert!(session.result().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_diagnosis() {
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let result = analyze_image(
            &mut session,
            Path::new("/nonexistent/leaf.jpg"),
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await;

        assert!(matches!(result, Err(CoffeeAiError::FileNotFound(_))));
        assert_eq!(session.view(), View::Home);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_result() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();

        let outcome = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut BrokenStore,
        )
        .await
        .unwrap();

        assert!(!outcome.saved);
        assert!(outcome.warning.as_deref().unwrap().contains("quota exceeded"));
        assert_eq!(session.view(), View::Result);
    }

    #[tokio::test]
    async fn test_no_save_skips_store() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();
        let mut store = MemoryStore::default();
        let opts = AnalyzeOptions {
            save: false,
            ..options(CaptureSource::Upload)
        };

        let outcome = analyze_image(
            &mut session,
            &path,
            &opts,
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await
        .unwrap();

        assert!(!outcome.saved);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_image_keeps_full_data_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leaf.jpg");
        std::fs::write(&path, b"raw camera bytes").unwrap();
        let mut session = Session::new();
        let mut store = MemoryStore::default();

        let outcome = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Camera),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await
        .unwrap();

        let expected = EncodedImage::from_bytes(b"raw camera bytes", "image/jpeg").to_data_url();
        assert_eq!(outcome.record.thumbnail, expected);
    }

    #[tokio::test]
    async fn test_session_must_start_home() {
        let (_dir, path) = leaf_image();
        let mut session = Session::new();
        session.open_map().unwrap();
        let mut store = MemoryStore::default();

        let result = analyze_image(
            &mut session,
            &path,
            &options(CaptureSource::Upload),
            &FakeDiagnoser { fail: false },
            &device(),
            &mut store,
        )
        .await;

        assert!(matches!(result, Err(CoffeeAiError::Common(_))));
        assert_eq!(session.view(), View::Map);
    }
}
