//! Structured recipe validation.
//!
//! A recipe is stored as a JSON object of the shape:
//!
//! ```json
//! {
//!   "ingredients": [{ "name": "Gin", "amount": "4 cl", "optional": false }],
//!   "steps": [{ "order": 1, "instruction": "Shake with ice" }],
//!   "preparation_time": 3
//! }
//! ```
//!
//! Every top-level key is optional. Admin clients sometimes send the recipe
//! as a string holding the JSON document, so both forms are accepted.

use serde_json::Value;

use crate::error::CoreError;

fn invalid(msg: impl std::fmt::Display) -> CoreError {
    CoreError::Validation(format!("Invalid recipe: {msg}"))
}

/// Validate a recipe value and return its normalized object form.
///
/// Returns `Ok(None)` for `null`, a blank string, or an empty object,
/// meaning "no recipe".
pub fn validate_recipe(value: &Value) -> Result<Option<Value>, CoreError> {
    let recipe = match value {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .map_err(|e| invalid(format!("recipe string is not valid JSON ({e})")))?,
        other => other.clone(),
    };

    let obj = recipe
        .as_object()
        .ok_or_else(|| invalid("recipe must be a JSON object"))?;
    if obj.is_empty() {
        return Ok(None);
    }

    if let Some(ingredients) = obj.get("ingredients") {
        let items = ingredients
            .as_array()
            .ok_or_else(|| invalid("ingredients must be an array"))?;
        for (i, item) in items.iter().enumerate() {
            let entry = item
                .as_object()
                .ok_or_else(|| invalid(format!("ingredient {i} must be an object")))?;
            if !entry.contains_key("name") || !entry.contains_key("amount") {
                return Err(invalid(format!(
                    "ingredient {i} must have 'name' and 'amount'"
                )));
            }
            if let Some(optional) = entry.get("optional") {
                if !optional.is_boolean() {
                    return Err(invalid(format!(
                        "ingredient {i} 'optional' must be a boolean"
                    )));
                }
            }
        }
    }

    if let Some(steps) = obj.get("steps") {
        let items = steps
            .as_array()
            .ok_or_else(|| invalid("steps must be an array"))?;
        for (i, item) in items.iter().enumerate() {
            let step = item
                .as_object()
                .ok_or_else(|| invalid(format!("step {i} must be an object")))?;
            if !step.contains_key("order") || !step.contains_key("instruction") {
                return Err(invalid(format!(
                    "step {i} must have 'order' and 'instruction'"
                )));
            }
            let order_is_int = step
                .get("order")
                .map(|o| o.is_i64() || o.is_u64())
                .unwrap_or(false);
            if !order_is_int {
                return Err(invalid(format!("step {i} 'order' must be an integer")));
            }
        }
    }

    if let Some(prep) = obj.get("preparation_time") {
        if !prep.is_number() {
            return Err(invalid("preparation_time must be a number"));
        }
    }

    Ok(Some(recipe))
}
