//! Range and enum checks on the five calculator inputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// Accepted body weight, kilograms.
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 40.0..=200.0;
/// Accepted height, centimeters.
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 140.0..=220.0;
/// Accepted age, whole years.
pub const AGE_RANGE: RangeInclusive<i64> = 15..=80;

/// Input field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Weight,
    Height,
    Age,
    Gender,
    ActivityLevel,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputField::Weight => "weight",
            InputField::Height => "height",
            InputField::Age => "age",
            InputField::Gender => "gender",
            InputField::ActivityLevel => "activity_level",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violated input constraint.
///
/// Only the first failing check is reported, so every error names exactly
/// one field and one constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: InputField,
    /// The violated range or value set, e.g. `"40-200 kg"`.
    pub constraint: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: InputField, constraint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == lowered)
            .ok_or_else(|| {
                ValidationError::new(
                    InputField::Gender,
                    "male | female",
                    format!("Gender must be either 'male' or 'female'. Got: {}", s),
                )
            })
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical activity level used to scale BMR into TDEE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Heavy exercise 6-7 days/week
    Active,
    /// Very heavy exercise, physical job
    #[serde(rename = "very active")]
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very active",
        }
    }

    /// TDEE multiplier applied to BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    fn accepted_values() -> String {
        let names: Vec<String> = Self::ALL
            .iter()
            .map(|a| format!("'{}'", a.as_str()))
            .collect();
        format!("[{}]", names.join(", "))
    }
}

impl FromStr for ActivityLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        ActivityLevel::ALL
            .into_iter()
            .find(|a| a.as_str() == lowered)
            .ok_or_else(|| {
                let accepted = ActivityLevel::accepted_values();
                ValidationError::new(
                    InputField::ActivityLevel,
                    accepted.clone(),
                    format!("Activity level must be one of: {}. Got: {}", accepted, s),
                )
            })
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculator inputs that have passed every range and enum check.
///
/// Only [`validate_inputs`] constructs this type, so holding one is proof of
/// validity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthInputs {
    weight_kg: f64,
    height_cm: f64,
    age: i64,
    gender: Gender,
    activity_level: ActivityLevel,
}

impl HealthInputs {
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn activity_level(&self) -> ActivityLevel {
        self.activity_level
    }
}

/// Validate raw inputs in field order, surfacing the first failure.
///
/// `gender` and `activity_level` are matched case-insensitively.
///
/// # Errors
///
/// Returns [`ValidationError`] naming the first field outside its accepted
/// range or value set.
pub fn validate_inputs(
    weight_kg: f64,
    height_cm: f64,
    age: i64,
    gender: &str,
    activity_level: &str,
) -> Result<HealthInputs, ValidationError> {
    // NaN fails `contains`, so it is rejected along with out-of-range values.
    if !WEIGHT_RANGE_KG.contains(&weight_kg) {
        return Err(ValidationError::new(
            InputField::Weight,
            "40-200 kg",
            format!("Weight must be between 40-200 kg. Got: {}kg", weight_kg),
        ));
    }

    if !HEIGHT_RANGE_CM.contains(&height_cm) {
        return Err(ValidationError::new(
            InputField::Height,
            "140-220 cm",
            format!("Height must be between 140-220 cm. Got: {}cm", height_cm),
        ));
    }

    if !AGE_RANGE.contains(&age) {
        return Err(ValidationError::new(
            InputField::Age,
            "15-80 years",
            format!("Age must be between 15-80 years. Got: {} years", age),
        ));
    }

    let gender = gender.parse::<Gender>()?;
    let activity_level = activity_level.parse::<ActivityLevel>()?;

    Ok(HealthInputs {
        weight_kg,
        height_cm,
        age,
        gender,
        activity_level,
    })
}
