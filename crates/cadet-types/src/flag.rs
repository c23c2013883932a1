//! Feature-flag evaluation types for cadet.
//!
//! These types model the data shapes for flag provider interactions:
//! targeting contexts, typed flag values, resolution outcomes, and errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifying data used by the flag service to personalize resolution.
///
/// Built once at startup and never mutated afterwards: attributes can only
/// be added through the consuming builder methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    targeting_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, serde_json::Value>,
}

impl EvaluationContext {
    /// Create a context for the given targeting key with no attributes.
    pub fn new(targeting_key: impl Into<String>) -> Self {
        Self {
            targeting_key: targeting_key.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute, returning the extended context.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn targeting_key(&self) -> &str {
        &self.targeting_key
    }

    pub fn attributes(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attributes
    }
}

/// The value types a flag can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagKind {
    String,
    Boolean,
    Number,
    #[serde(rename = "JSON")]
    Json,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::String => write!(f, "String"),
            FlagKind::Boolean => write!(f, "Boolean"),
            FlagKind::Number => write!(f, "Number"),
            FlagKind::Json => write!(f, "JSON"),
        }
    }
}

/// A flag value as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    String(String),
    Boolean(bool),
    Number(f64),
    Json(serde_json::Value),
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Boolean(_) => FlagKind::Boolean,
            FlagValue::Number(_) => FlagKind::Number,
            FlagValue::Json(_) => FlagKind::Json,
        }
    }
}

/// Rust types that a flag can be resolved into.
///
/// Implemented for the four flag kinds: `String`, `bool`, `f64` and
/// `serde_json::Value`.
pub trait FlagType: Sized {
    const KIND: FlagKind;

    /// Convert a provider value into `Self`, or `None` when the kinds differ.
    fn from_flag_value(value: FlagValue) -> Option<Self>;
}

impl FlagType for String {
    const KIND: FlagKind = FlagKind::String;

    fn from_flag_value(value: FlagValue) -> Option<Self> {
        match value {
            FlagValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FlagType for bool {
    const KIND: FlagKind = FlagKind::Boolean;

    fn from_flag_value(value: FlagValue) -> Option<Self> {
        match value {
            FlagValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl FlagType for f64 {
    const KIND: FlagKind = FlagKind::Number;

    fn from_flag_value(value: FlagValue) -> Option<Self> {
        match value {
            FlagValue::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl FlagType for serde_json::Value {
    const KIND: FlagKind = FlagKind::Json;

    fn from_flag_value(value: FlagValue) -> Option<Self> {
        match value {
            FlagValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Outcome of resolving one flag: either the served value or the caller's
/// default together with the reason the provider could not serve it.
#[derive(Debug)]
pub enum Resolution<T> {
    Value(T),
    Fallback { value: T, reason: FlagError },
}

impl<T> Resolution<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolution::Value(value) | Resolution::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Resolution::Value(value) | Resolution::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FlagError> {
        match self {
            Resolution::Value(_) => None,
            Resolution::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// A flag whose default was used, kept so the caller can report it.
#[derive(Debug)]
pub struct FlagFallback {
    pub key: String,
    pub reason: FlagError,
}

/// Errors from flag provider operations.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("provider is not ready")]
    ProviderNotReady,

    #[error("flag '{key}' not found")]
    NotFound { key: String },

    #[error("flag '{key}' has type {actual}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: FlagKind,
        actual: FlagKind,
    },

    #[error("flag service rejected the server key")]
    Unauthorized,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}
