//! The `calculate_health_metrics` tool.

use super::{Tool, ToolError};
use crate::health::{
    compute, validate_inputs, ActivityLevel, Gender, HealthInputs, HealthMetrics, ValidationError,
};
use crate::types::ToolDefinition;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

pub const TOOL_NAME: &str = "calculate_health_metrics";

const TOOL_DESCRIPTION: &str = "Calculate comprehensive health metrics including BMI, BMR, TDEE, \
recommended calorie intake for different goals and the healthy weight range. \
Call this once weight, height, age, gender and activity level are known.";

/// Typed arguments of `calculate_health_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalculateHealthMetricsArgs {
    /// Current weight in kilograms (40-200 kg)
    pub weight_kg: f64,
    /// Height in centimeters (140-220 cm)
    pub height_cm: f64,
    /// Age in years (15-80 years)
    #[serde(deserialize_with = "deserialize_whole_number")]
    #[schemars(with = "i64")]
    pub age: i64,
    /// "male" or "female"
    pub gender: String,
    /// One of "sedentary", "light", "moderate", "active", "very active"
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
}

fn default_activity_level() -> String {
    ActivityLevel::default().as_str().to_string()
}

// Models frequently emit `30.0` for integer fields.
fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(D::Error::custom(format!(
            "expected a whole number of years, got {}",
            n
        )));
    }
    Ok(n as i64)
}

impl CalculateHealthMetricsArgs {
    pub fn validate(&self) -> Result<HealthInputs, ValidationError> {
        validate_inputs(
            self.weight_kg,
            self.height_cm,
            self.age,
            &self.gender,
            &self.activity_level,
        )
    }

    /// Validate, then compute the full report.
    pub fn evaluate(&self) -> Result<HealthMetricsReport, ValidationError> {
        let inputs = self.validate()?;
        Ok(HealthMetricsReport {
            metrics: compute(&inputs),
            input_summary: InputSummary::from(&inputs),
        })
    }
}

/// Normalized echo of the inputs the metrics were computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSummary {
    pub weight: f64,
    pub height: f64,
    pub age: i64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl From<&HealthInputs> for InputSummary {
    fn from(inputs: &HealthInputs) -> Self {
        Self {
            weight: inputs.weight_kg(),
            height: inputs.height_cm(),
            age: inputs.age(),
            gender: inputs.gender(),
            activity_level: inputs.activity_level(),
        }
    }
}

/// Return value of the tool: the metrics plus the input summary, flattened
/// into one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetricsReport {
    #[serde(flatten)]
    pub metrics: HealthMetrics,
    pub input_summary: InputSummary,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalculateHealthMetricsTool;

#[async_trait]
impl Tool for CalculateHealthMetricsTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        let schema = schemars::schema_for!(CalculateHealthMetricsArgs);
        let mut parameters = serde_json::to_value(schema).unwrap_or(Value::Null);
        if let Value::Object(ref mut map) = parameters {
            map.remove("$schema");
            map.remove("title");
        }
        ToolDefinition::function(TOOL_NAME, TOOL_DESCRIPTION, parameters)
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: CalculateHealthMetricsArgs =
            serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
                tool: TOOL_NAME.to_string(),
                source,
            })?;
        debug!(?args, "calculating health metrics");

        let report = args.evaluate()?;
        serde_json::to_value(report).map_err(|e| ToolError::Execution(e.to_string()))
    }
}
