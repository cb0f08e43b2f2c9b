//! 診断クライアント
//!
//! 画像を転送用文字列（Base64）にしてモデルへ送り、構造化された診断を受け取る

mod gemini;

pub use gemini::GeminiClient;

use crate::error::{CoffeeAiError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use coffee_ai_common::AnalysisResult;
use std::future::Future;
use std::path::Path;

/// 転送用にエンコードした画像
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Base64（Data URLの接頭辞なし）
    pub data: String,
}

impl EncodedImage {
    /// Data URL または素のBase64文字列から作成
    pub fn from_transport(s: &str) -> Self {
        Self {
            mime_type: extract_mime_type_from_data_url(s).to_string(),
            data: strip_data_url_prefix(s).to_string(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Data URLからBase64データ部分を取り出す。接頭辞が無ければそのまま返す
///
/// "data:image/jpeg;base64,/9j/4AAQ..." → "/9j/4AAQ..."
pub fn strip_data_url_prefix(s: &str) -> &str {
    match s.split_once(',') {
        Some((head, data)) if head.starts_with("data:") => data,
        _ => s,
    }
}

/// Data URLからMIMEタイプを取り出す。取れなければ "image/jpeg"
pub fn extract_mime_type_from_data_url(s: &str) -> &str {
    s.strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .filter(|m| !m.is_empty())
        .unwrap_or("image/jpeg")
}

/// 拡張子からMIMEタイプを推定
pub fn mime_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// 画像ファイルを読み込んでエンコード（元のバイト列も返す）
pub fn encode_image(path: &Path) -> Result<(EncodedImage, Vec<u8>)> {
    if !path.exists() {
        return Err(CoffeeAiError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)
        .map_err(|e| CoffeeAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let encoded = EncodedImage::from_bytes(&bytes, mime_type_for_path(path));
    Ok((encoded, bytes))
}

/// 画像を診断するリモートモデル
pub trait Diagnoser {
    fn diagnose(&self, image: &EncodedImage) -> impl Future<Output = Result<AnalysisResult>> + Send;
}
