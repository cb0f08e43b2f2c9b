//! APIレスポンスパーサー
//!
//! モデルの応答テキストからJSONオブジェクトを抽出し、
//! 診断結果（Diagnosis）としてパースする

use crate::error::{Error, Result};
use crate::types::{AnalysisResult, Diagnosis};

/// 応答テキストからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
/// 3. エラー
///
/// # Examples
/// ```
/// use coffee_ai_common::extract_json;
///
/// let response = "result: {\"diagnosis\": \"Healthy\"}";
/// assert_eq!(extract_json(response).unwrap(), "{\"diagnosis\": \"Healthy\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONオブジェクトが見つかりません".into()))
}

/// 診断レスポンスをパース
///
/// # Returns
/// * `Err(Error::EmptyResponse)` - テキストが空
/// * `Err(Error::Parse)` - JSONが見つからない、またはスキーマ不一致
pub fn parse_diagnosis_response(response: &str) -> Result<Diagnosis> {
    if response.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    let json_str = extract_json(response)?;
    serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("診断JSONパースエラー: {}", e)))
}

/// 診断レスポンスをパースしてヘルススコアを付与
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    parse_diagnosis_response(response).map(AnalysisResult::from_diagnosis)
}
