use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoffeeAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`coffee-ai config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("モデルから応答がありません")]
    EmptyResponse,

    #[error("位置情報の取得に失敗: {0}")]
    Location(String),

    #[error("履歴の保存に失敗: {0}")]
    Storage(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] coffee_ai_common::Error),
}

impl From<reqwest::Error> for CoffeeAiError {
    fn from(e: reqwest::Error) -> Self {
        CoffeeAiError::ApiCall(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoffeeAiError>;
