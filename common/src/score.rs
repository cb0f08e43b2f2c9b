//! ヘルススコア計算
//!
//! 100点から重症度ペナルティとリスク要因の加重和を引き、
//! 0-100にクランプして四捨五入（0.5は0から遠い方へ）する

use crate::types::{Diagnosis, RiskFactors, Severity};

/// 重症度ごとの減点
pub fn severity_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 70.0,
        Severity::Moderate => 40.0,
        Severity::Low => 15.0,
        Severity::Healthy => 0.0,
    }
}

/// リスク要因の加重減点
///
/// 重み（百分率）: 病害 10, 害虫 15, 栄養欠乏 5, 環境ストレス 5。
/// 整数係数で合計してから100で割るため、整数入力なら .5 がちょうど表現される
pub fn risk_deduction(risk: &RiskFactors) -> f64 {
    let weighted = risk.disease_risk * 10.0
        + risk.pest_risk * 15.0
        + risk.nutrient_deficiency * 5.0
        + risk.environmental_stress * 5.0;
    weighted / 100.0
}

/// ヘルススコアを計算
///
/// # Examples
/// ```
/// use coffee_ai_common::{calculate_health_score, Diagnosis, RiskFactors, Severity};
///
/// let diagnosis = Diagnosis {
///     diagnosis: "Healthy".into(),
///     scientific_name: None,
///     plant_part: "Leaf".into(),
///     confidence: 95.0,
///     severity: Severity::Healthy,
///     visual_indicators: vec![],
///     summary: String::new(),
///     immediate_actions: vec![],
///     preventative_measures: vec![],
///     risk_factors: RiskFactors::default(),
///     weekly_plan: vec![],
/// };
/// assert_eq!(calculate_health_score(&diagnosis), 100);
/// ```
pub fn calculate_health_score(diagnosis: &Diagnosis) -> u8 {
    score_from_parts(diagnosis.severity, &diagnosis.risk_factors)
}

/// 重症度とリスク要因から直接スコアを計算
pub fn score_from_parts(severity: Severity, risk: &RiskFactors) -> u8 {
    let score = 100.0 - severity_penalty(severity) - risk_deduction(risk);
    if score.is_nan() {
        return 0;
    }
    // f64::round は 0.5 を 0 から遠い方へ丸める
    score.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(pest: f64, disease: f64, nutrient: f64, stress: f64) -> RiskFactors {
        RiskFactors {
            pest_risk: pest,
            disease_risk: disease,
            environmental_stress: stress,
            nutrient_deficiency: nutrient,
        }
    }

    #[test]
    fn test_healthy_no_risk_is_100() {
        assert_eq!(score_from_parts(Severity::Healthy, &risk(0.0, 0.0, 0.0, 0.0)), 100);
    }

    #[test]
    fn test_critical_full_risk_clamped_to_zero() {
        // 100 - 70 - 35 = -5
        assert_eq!(score_from_parts(Severity::Critical, &risk(100.0, 100.0, 100.0, 100.0)), 0);
    }

    #[test]
    fn test_moderate_mixed_risk() {
        // 100 - 40 - (2 + 6 + 0.5 + 0.5) = 51
        assert_eq!(score_from_parts(Severity::Moderate, &risk(40.0, 20.0, 10.0, 10.0)), 51);
    }

    #[test]
    fn test_half_rounds_up_low() {
        // 100 - 15 - 1.5 = 83.5
        assert_eq!(score_from_parts(Severity::Low, &risk(10.0, 0.0, 0.0, 0.0)), 84);
    }

    #[test]
    fn test_half_rounds_up_near_fifty() {
        // 100 - 15 - (15 + 10 + 5 + 4.5) = 50.5
        assert_eq!(score_from_parts(Severity::Low, &risk(100.0, 100.0, 100.0, 90.0)), 51);
    }

    #[test]
    fn test_negative_half_clamps_to_zero() {
        // 100 - 70 - 34.5 = -4.5
        assert_eq!(score_from_parts(Severity::Critical, &risk(100.0, 100.0, 100.0, 90.0)), 0);
    }

    #[test]
    fn test_severity_penalties() {
        assert_eq!(severity_penalty(Severity::Critical), 70.0);
        assert_eq!(severity_penalty(Severity::Moderate), 40.0);
        assert_eq!(severity_penalty(Severity::Low), 15.0);
        assert_eq!(severity_penalty(Severity::Healthy), 0.0);
    }

    #[test]
    fn test_score_always_in_range() {
        let steps = [0.0, 12.5, 33.3, 50.0, 77.7, 100.0];
        for severity in Severity::ALL {
            for &p in &steps {
                for &d in &steps {
                    for &n in &steps {
                        for &s in &steps {
                            let score = score_from_parts(severity, &risk(p, d, n, s));
                            assert!(score <= 100, "{severity} {p} {d} {n} {s} -> {score}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_higher_severity_never_scores_higher() {
        let r = risk(30.0, 30.0, 30.0, 30.0);
        let scores: Vec<u8> = Severity::ALL.iter().map(|&s| score_from_parts(s, &r)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
