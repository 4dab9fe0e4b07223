use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Body of POST /plans/generate. `day`, `meal` and `calories` arrive from the
/// client as either JSON numbers or numeric strings, so they are accepted
/// loosely here and coerced in [`GenerateRequest::validate`].
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub day: Option<Value>,
    #[serde(default)]
    pub meal: Option<Value>,
    #[serde(default)]
    pub calories: Option<Value>,
    #[serde(default)]
    pub dietary: Option<String>,
}

/// A generation request after required-field and coercion checks. This is
/// the only shape the pipeline operates on.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub ingredients: Vec<String>,
    pub days: u32,
    pub meals_per_day: u32,
    pub target_calories: f64,
    pub dietary: Option<String>,
}

impl GenerateRequest {
    /// Succeeds only when ingredients are non-empty and day, meal and calorie
    /// fields are present, non-blank and numeric. A numeric 0 counts as
    /// absent, while the string "0" passes and later yields an empty plan.
    /// No external call is made when this fails.
    pub fn validate(self) -> Result<PlanRequest, ApiError> {
        let missing = || ApiError::Validation("Missing required data".to_string());

        if self.ingredients.is_empty() {
            return Err(missing());
        }
        let day = self.day.as_ref().filter(|v| is_truthy(v)).ok_or_else(missing)?;
        let meal = self.meal.as_ref().filter(|v| is_truthy(v)).ok_or_else(missing)?;
        let calories = self
            .calories
            .as_ref()
            .filter(|v| is_truthy(v))
            .ok_or_else(missing)?;

        let days = as_u32(day).ok_or_else(missing)?;
        let meals_per_day = as_u32(meal).ok_or_else(missing)?;
        let target_calories = as_f64(calories).ok_or_else(missing)?;

        Ok(PlanRequest {
            ingredients: self.ingredients,
            days,
            meals_per_day,
            target_calories,
            dietary: self.dietary,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Body of POST /plans/saved.
#[derive(Debug, Deserialize)]
pub struct SavePlanRequest {
    #[serde(default)]
    pub name: String,
}

/// One entry in the saved-plan listing. The human-chosen name is the storage
/// key, so id and name are the same string.
#[derive(Debug, Serialize)]
pub struct SavedPlanItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
}
