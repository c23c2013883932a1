//! DevCycle bucketing API request and response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cadet_types::flag::{EvaluationContext, FlagError, FlagKind, FlagValue};

/// User payload sent with every evaluation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevCycleUser {
    pub user_id: String,
    #[serde(rename = "customData", skip_serializing_if = "serde_json::Map::is_empty")]
    pub custom_data: serde_json::Map<String, serde_json::Value>,
}

impl From<&EvaluationContext> for DevCycleUser {
    fn from(context: &EvaluationContext) -> Self {
        Self {
            user_id: context.targeting_key().to_string(),
            custom_data: context
                .attributes()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// A variable as served by the bucketing API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DevCycleVariable {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub value: serde_json::Value,
}

impl DevCycleVariable {
    /// Convert the raw JSON value into a [`FlagValue`] of the declared type.
    pub fn to_flag_value(&self) -> Result<FlagValue, FlagError> {
        let mismatch = || {
            FlagError::Deserialization(format!(
                "variable '{}' declared as {} but value is {}",
                self.key, self.kind, self.value
            ))
        };
        match self.kind {
            FlagKind::String => self
                .value
                .as_str()
                .map(|s| FlagValue::String(s.to_string()))
                .ok_or_else(mismatch),
            FlagKind::Boolean => self.value.as_bool().map(FlagValue::Boolean).ok_or_else(mismatch),
            FlagKind::Number => self.value.as_f64().map(FlagValue::Number).ok_or_else(mismatch),
            FlagKind::Json => Ok(FlagValue::Json(self.value.clone())),
        }
    }
}

/// Response of `POST /v1/variables`: variables keyed by variable key.
pub type VariableMap = HashMap<String, DevCycleVariable>;
