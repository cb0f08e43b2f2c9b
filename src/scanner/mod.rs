pub(crate) mod exif;

pub use self::exif::ImageMetadata;

use crate::error::{CoffeeAiError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(CoffeeAiError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| ImageInfo::from_path(e.path()))
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// ファイルならその1枚、フォルダなら直下の画像すべて
pub fn collect_images(path: &Path) -> Result<Vec<ImageInfo>> {
    if path.is_file() {
        return Ok(vec![ImageInfo::from_path(path)]);
    }
    let images = scan_folder(path)?;
    if images.is_empty() {
        return Err(CoffeeAiError::NoImagesFound(path.display().to_string()));
    }
    Ok(images)
}

/// 画像タグから位置と撮影日時を取り出す
///
/// タグが無い・読めない場合は空の結果を返し、エラーにはしない
pub fn extract_metadata(path: &Path) -> ImageMetadata {
    match exif::read_exif(path) {
        Ok(data) => {
            let meta = exif::metadata_from_exif(&data);
            if meta.is_empty() {
                tracing::debug!(file = %path.display(), "EXIFに位置・日時がありません");
            }
            meta
        }
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "EXIFを読めませんでした");
            ImageMetadata::default()
        }
    }
}
