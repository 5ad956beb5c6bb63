//! BMI, BMR (Mifflin-St Jeor), TDEE and calorie target formulas.

use super::validator::{Gender, HealthInputs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// BMI band (WHO), ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    #[serde(rename = "Severe Thinness")]
    SevereThinness,
    #[serde(rename = "Moderate Thinness")]
    ModerateThinness,
    #[serde(rename = "Mild Thinness")]
    MildThinness,
    #[serde(rename = "Normal Weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obese Class I")]
    ObeseClassI,
    #[serde(rename = "Obese Class II")]
    ObeseClassII,
    #[serde(rename = "Obese Class III")]
    ObeseClassIII,
}

impl BmiCategory {
    /// Upper (exclusive) bound of each band; the last band is open-ended.
    const THRESHOLDS: [(f64, BmiCategory); 7] = [
        (16.0, BmiCategory::SevereThinness),
        (17.0, BmiCategory::ModerateThinness),
        (18.5, BmiCategory::MildThinness),
        (25.0, BmiCategory::NormalWeight),
        (30.0, BmiCategory::Overweight),
        (35.0, BmiCategory::ObeseClassI),
        (40.0, BmiCategory::ObeseClassII),
    ];

    /// Look up the band for an unrounded BMI. First matching threshold wins.
    pub fn from_bmi(bmi: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(upper, _)| bmi < *upper)
            .map(|(_, category)| *category)
            .unwrap_or(BmiCategory::ObeseClassIII)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::SevereThinness => "Severe Thinness",
            BmiCategory::ModerateThinness => "Moderate Thinness",
            BmiCategory::MildThinness => "Mild Thinness",
            BmiCategory::NormalWeight => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseClassI => "Obese Class I",
            BmiCategory::ObeseClassII => "Obese Class II",
            BmiCategory::ObeseClassIII => "Obese Class III",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily calorie targets per goal, kcal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedCalories {
    pub maintain: i64,
    /// 0.5 kg/week loss
    pub mild_loss: i64,
    /// 1 kg/week loss
    pub moderate_loss: i64,
    /// 0.5 kg/week gain
    pub mild_gain: i64,
    /// 1 kg/week gain
    pub moderate_gain: i64,
}

/// Weight bounds (kg) for BMI 18.5-24.9 at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Rounded to one decimal.
    pub bmi: f64,
    /// Derived from the unrounded BMI.
    pub bmi_category: BmiCategory,
    pub bmr: i64,
    pub tdee: i64,
    pub recommended_calories: RecommendedCalories,
    pub healthy_weight_range: WeightRange,
}

const HEALTHY_BMI_MIN: f64 = 18.5;
const HEALTHY_BMI_MAX: f64 = 24.9;

/// Compute all metrics from already-validated inputs.
///
/// Pure and deterministic. Intermediate values stay unrounded; rounding is
/// applied once per output field (half away from zero).
pub fn compute(inputs: &HealthInputs) -> HealthMetrics {
    let weight = inputs.weight_kg();
    let height_cm = inputs.height_cm();
    let height_m = height_cm / 100.0;

    let bmi = weight / height_m.powi(2);

    let gender_offset = match inputs.gender() {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    let bmr = 10.0 * weight + 6.25 * height_cm - 5.0 * inputs.age() as f64 + gender_offset;
    let tdee = bmr * inputs.activity_level().multiplier();

    HealthMetrics {
        bmi: round_to(bmi, 1),
        bmi_category: BmiCategory::from_bmi(bmi),
        bmr: round_int(bmr),
        tdee: round_int(tdee),
        recommended_calories: RecommendedCalories {
            maintain: round_int(tdee),
            mild_loss: round_int(tdee - 500.0),
            moderate_loss: round_int(tdee - 1000.0),
            mild_gain: round_int(tdee + 500.0),
            moderate_gain: round_int(tdee + 1000.0),
        },
        healthy_weight_range: healthy_weight_range(height_cm),
    }
}

/// Healthy weight range for a height, each bound rounded to one decimal.
pub(crate) fn healthy_weight_range(height_cm: f64) -> WeightRange {
    let height_m_sq = (height_cm / 100.0).powi(2);
    WeightRange {
        min: round_to(HEALTHY_BMI_MIN * height_m_sq, 1),
        max: round_to(HEALTHY_BMI_MAX * height_m_sq, 1),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn round_int(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::validate_inputs;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(BmiCategory::from_bmi(15.99), BmiCategory::SevereThinness);
        assert_eq!(BmiCategory::from_bmi(16.0), BmiCategory::ModerateThinness);
        assert_eq!(BmiCategory::from_bmi(18.4999), BmiCategory::MildThinness);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(24.9999), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(39.9999), BmiCategory::ObeseClassII);
        assert_eq!(BmiCategory::from_bmi(40.0), BmiCategory::ObeseClassIII);
        assert_eq!(BmiCategory::from_bmi(75.0), BmiCategory::ObeseClassIII);
    }

    #[test]
    fn test_categories_are_ordered() {
        assert!(BmiCategory::SevereThinness < BmiCategory::NormalWeight);
        assert!(BmiCategory::ObeseClassII < BmiCategory::ObeseClassIII);
    }

    #[test]
    fn test_reference_male_moderate() {
        let inputs = validate_inputs(70.0, 170.0, 30, "male", "moderate").unwrap();
        let m = compute(&inputs);

        assert_eq!(m.bmi, 24.2);
        assert_eq!(m.bmi_category, BmiCategory::NormalWeight);
        // 700 + 1062.5 - 150 + 5
        assert_eq!(m.bmr, 1618);
        // 1617.5 * 1.55 = 2507.125
        assert_eq!(m.tdee, 2507);
        assert_eq!(m.recommended_calories.maintain, 2507);
        assert_eq!(m.recommended_calories.mild_loss, 2007);
        assert_eq!(m.recommended_calories.moderate_loss, 1507);
        assert_eq!(m.recommended_calories.mild_gain, 3007);
        assert_eq!(m.recommended_calories.moderate_gain, 3507);
        assert_eq!(m.healthy_weight_range, WeightRange { min: 53.5, max: 72.0 });
    }

    #[test]
    fn test_female_offset() {
        let inputs = validate_inputs(60.0, 165.0, 40, "female", "sedentary").unwrap();
        let m = compute(&inputs);
        // 600 + 1031.25 - 200 - 161 = 1270.25
        assert_eq!(m.bmr, 1270);
        // 1270.25 * 1.2 = 1524.3
        assert_eq!(m.tdee, 1524);
    }

    #[test]
    fn test_calories_use_unrounded_tdee() {
        // bmr = 10*50 + 6.25*150 - 5*20 + 5 = 1342.5; tdee = 1342.5 * 1.375 = 1845.9375
        let inputs = validate_inputs(50.0, 150.0, 20, "male", "light").unwrap();
        let m = compute(&inputs);
        assert_eq!(m.bmr, 1343);
        assert_eq!(m.tdee, 1846);
        assert_eq!(m.recommended_calories.mild_loss, 1346);
        // Offsetting the rounded bmr would give round(1343 * 1.375) = 1847.
        assert_ne!(m.tdee, round_int(m.bmr as f64 * 1.375));
    }

    #[test]
    fn test_compute_is_deterministic() {
        let inputs = validate_inputs(83.4, 181.2, 47, "male", "active").unwrap();
        let a = compute(&inputs);
        let b = compute(&inputs);
        assert_eq!(a, b);
        assert_eq!(a.bmi.to_bits(), b.bmi.to_bits());
    }
}
