//! Gemini API連携
//!
//! インライン画像 + 固定プロンプト + responseSchema を送信し、
//! 返ってきたJSONテキストを診断結果としてパースする

use super::{Diagnoser, EncodedImage};
use crate::config::Config;
use crate::error::{CoffeeAiError, Result};
use coffee_ai_common::{analysis_schema, parse_diagnosis_response, AnalysisResult, DIAGNOSIS_PROMPT};
use serde::{Deserialize, Serialize};

/// 7日間プランの想定日数
const WEEKLY_PLAN_DAYS: usize = 7;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// 先頭候補のテキストを連結（無ければ None）
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn build_request(image: &EncodedImage, temperature: f32) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
                Part::Text {
                    text: DIAGNOSIS_PROMPT.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature,
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_schema(),
        },
    }
}

/// 応答テキストを診断結果へ変換してヘルススコアを付与
fn parse_response_text(text: &str) -> Result<AnalysisResult> {
    let diagnosis = parse_diagnosis_response(text).map_err(|e| match e {
        coffee_ai_common::Error::EmptyResponse => CoffeeAiError::EmptyResponse,
        other => CoffeeAiError::ApiParse(other.to_string()),
    })?;

    if diagnosis.weekly_plan.len() != WEEKLY_PLAN_DAYS {
        tracing::warn!(
            days = diagnosis.weekly_plan.len(),
            "7日間プランの日数が想定と異なります"
        );
    }

    Ok(AnalysisResult::from_diagnosis(diagnosis))
}

/// Gemini generateContent クライアント
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            temperature,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.api_base_url.clone(),
            config.model.clone(),
            config.get_api_key()?,
            config.temperature,
        ))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl Diagnoser for GeminiClient {
    async fn diagnose(&self, image: &EncodedImage) -> Result<AnalysisResult> {
        let request = build_request(image, self.temperature);
        tracing::info!(model = %self.model, bytes = image.data.len(), "Gemini へ診断を依頼します");

        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint(), self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CoffeeAiError::ApiCall(format!("API error: {}: {}", status, body)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CoffeeAiError::ApiParse(e.to_string()))?;

        let text = payload.text().ok_or(CoffeeAiError::EmptyResponse)?;
        tracing::debug!(chars = text.len(), "Gemini 応答を受信");

        parse_response_text(&text)
    }
}
