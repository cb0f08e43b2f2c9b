//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use coffee_ai::analyzer;
use coffee_ai::error::CoffeeAiError;
use coffee_ai::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(CoffeeAiError::FileNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path());

    // スキャン自体は空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 画像のないフォルダを解析対象にした場合
#[test]
fn test_collect_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::collect_images(dir.path());
    assert!(matches!(result, Err(CoffeeAiError::NoImagesFound(_))));
}

/// 存在しない画像のエンコード
#[test]
fn test_encode_missing_image() {
    let result = analyzer::encode_image(Path::new("/nonexistent/leaf.jpg"));
    assert!(matches!(result, Err(CoffeeAiError::FileNotFound(_))));
}

/// 壊れた画像でもタグ抽出はエラーにならない
#[test]
fn test_extract_metadata_from_garbage() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"\xff\xd8 not really a jpeg").unwrap();

    let meta = scanner::extract_metadata(&path);
    assert!(meta.location.is_none());
    assert!(meta.timestamp.is_none());
}

/// CoffeeAiErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CoffeeAiError::Config("テスト設定エラー".to_string()),
        CoffeeAiError::MissingApiKey,
        CoffeeAiError::FileNotFound("leaf.jpg".to_string()),
        CoffeeAiError::ImageLoad("decode".to_string()),
        CoffeeAiError::NoImagesFound("フォルダ".to_string()),
        CoffeeAiError::ApiCall("API呼び出し失敗".to_string()),
        CoffeeAiError::ApiParse("missing field".to_string()),
        CoffeeAiError::EmptyResponse,
        CoffeeAiError::Location("denied".to_string()),
        CoffeeAiError::Storage("quota".to_string()),
        CoffeeAiError::Prompt("interrupted".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let inner = coffee_ai_common::Error::Parse("bad".to_string());
    let expected = inner.to_string();
    let err: CoffeeAiError = inner.into();
    assert_eq!(err.to_string(), expected);
}

/// APIキー未設定メッセージに設定方法が含まれる
#[test]
fn test_missing_api_key_hint() {
    let message = CoffeeAiError::MissingApiKey.to_string();
    assert!(message.contains("--set-api-key"));
    assert!(message.contains("GEMINI_API_KEY"));
}
