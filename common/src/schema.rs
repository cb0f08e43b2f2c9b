//! モデル出力スキーマ
//!
//! Gemini の `responseSchema` に渡す構造化出力の定義。
//! フィールド名・列挙値・必須リストは外部サービスとの契約なので変更しないこと

use crate::types::{Priority, Severity};
use serde_json::{json, Value};

/// 必須フィールド（scientificName 以外すべて）
pub const REQUIRED_FIELDS: &[&str] = &[
    "diagnosis",
    "plantPart",
    "severity",
    "confidence",
    "visualIndicators",
    "summary",
    "immediateActions",
    "preventativeMeasures",
    "riskFactors",
    "weeklyPlan",
];

/// リスク要因の必須フィールド
pub const RISK_FACTOR_FIELDS: &[&str] = &[
    "pestRisk",
    "diseaseRisk",
    "environmentalStress",
    "nutrientDeficiency",
];

/// 7日間プランの必須フィールド
pub const DAILY_PLAN_FIELDS: &[&str] = &["day", "task", "reason", "priority"];

/// 重症度の列挙値
pub fn severity_values() -> Vec<&'static str> {
    Severity::ALL.iter().map(|s| s.as_str()).collect()
}

/// 優先度の列挙値
pub fn priority_values() -> Vec<&'static str> {
    Priority::ALL.iter().map(|p| p.as_str()).collect()
}

fn string_array(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description
    })
}

/// 診断用レスポンススキーマを構築
pub fn analysis_schema() -> Value {
    let risk_properties: serde_json::Map<String, Value> = RISK_FACTOR_FIELDS
        .iter()
        .map(|name| {
            (
                name.to_string(),
                json!({ "type": "NUMBER", "description": "0-100" }),
            )
        })
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "diagnosis": {
                "type": "STRING",
                "description": "The primary diagnosis. Specific possibilities: Leaf Rust, Coffee Berry Borer, White Stem Borer, Nitrogen/Magnesium/Zinc Deficiency, Water Stress, Sun Scorch, or Healthy."
            },
            "scientificName": {
                "type": "STRING",
                "description": "Scientific name of the pest or pathogen (e.g., Hemileia vastatrix, Xylotrechus quadripes)."
            },
            "plantPart": {
                "type": "STRING",
                "description": "The specific part of the plant identified in the image (e.g., Leaf, Berry, Stem, Root, Whole Plant)."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence score between 0 and 100 based on visual clarity and characteristic symptoms."
            },
            "severity": {
                "type": "STRING",
                "enum": severity_values(),
                "description": "Severity of the infestation or deficiency."
            },
            "visualIndicators": string_array(
                "List of specific visual cues used to make the diagnosis (e.g., 'orange powdery spots', 'pinholes in berries', 'interveinal chlorosis')."
            ),
            "summary": {
                "type": "STRING",
                "description": "A concise, farmer-friendly explanation of the condition and its potential impact on yield."
            },
            "immediateActions": string_array(
                "3-5 distinct, actionable steps for immediate treatment (chemical/organic options relevant to India)."
            ),
            "preventativeMeasures": string_array(
                "Long-term cultural practices to prevent recurrence (e.g., shade management, soil amendment)."
            ),
            "riskFactors": {
                "type": "OBJECT",
                "properties": risk_properties,
                "required": RISK_FACTOR_FIELDS
            },
            "weeklyPlan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "STRING" },
                        "task": { "type": "STRING" },
                        "reason": { "type": "STRING" },
                        "priority": { "type": "STRING", "enum": priority_values() }
                    },
                    "required": DAILY_PLAN_FIELDS
                },
                "description": "A 7-day schedule for treatment and recovery."
            }
        },
        "required": REQUIRED_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_required_fields() {
        let schema = analysis_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        assert_eq!(required.len(), 10);
        assert!(required.contains(&"weeklyPlan"));
        assert!(!required.contains(&"scientificName"));
        assert!(!required.contains(&"healthScore"));
    }

    #[test]
    fn test_schema_severity_enum() {
        let schema = analysis_schema();
        assert_eq!(
            schema["properties"]["severity"]["enum"],
            json!(["Healthy", "Low", "Moderate", "Critical"])
        );
    }

    #[test]
    fn test_schema_priority_enum() {
        let schema = analysis_schema();
        assert_eq!(
            schema["properties"]["weeklyPlan"]["items"]["properties"]["priority"]["enum"],
            json!(["High", "Medium", "Low"])
        );
    }

    #[test]
    fn test_schema_risk_factors_numeric() {
        let schema = analysis_schema();
        let risk = &schema["properties"]["riskFactors"];
        for field in RISK_FACTOR_FIELDS {
            assert_eq!(risk["properties"][*field]["type"], "NUMBER");
        }
        assert_eq!(risk["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_schema_every_property_matches_wire_type() {
        // スキーマのプロパティ名と Diagnosis のシリアライズ名が一致すること
        let schema = analysis_schema();
        let props = schema["properties"].as_object().unwrap();
        for name in REQUIRED_FIELDS {
            assert!(props.contains_key(*name), "missing {name}");
        }
        assert!(props.contains_key("scientificName"));
        assert_eq!(props.len(), 11);
    }
}
