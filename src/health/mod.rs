//! Health metrics domain: input validation and the metrics calculator.
//!
//! # Health Module
//!
//! This module holds the only deterministic logic of the assistant: turning a
//! handful of body measurements into BMI, BMR, TDEE, calorie targets and a
//! healthy weight range.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HealthInputs`] | Validated, strongly typed calculator inputs |
//! | [`HealthMetrics`] | Calculator output, immutable once built |
//! | [`ValidationError`] | First violated field constraint |
//! | [`Gender`] / [`ActivityLevel`] | Case-insensitive enums parsed at the boundary |
//!
//! ## Example
//!
//! ```rust
//! use health_metrics_agent::health::{compute, validate_inputs};
//!
//! let inputs = validate_inputs(70.0, 170.0, 30, "male", "moderate").unwrap();
//! let metrics = compute(&inputs);
//! assert_eq!(metrics.bmi, 24.2);
//! assert_eq!(metrics.bmi_category.as_str(), "Normal Weight");
//! ```

mod calculator;
mod validator;

pub use calculator::{compute, BmiCategory, HealthMetrics, RecommendedCalories, WeightRange};
pub use validator::{
    validate_inputs, ActivityLevel, Gender, HealthInputs, InputField, ValidationError,
    AGE_RANGE, HEIGHT_RANGE_CM, WEIGHT_RANGE_KG,
};
