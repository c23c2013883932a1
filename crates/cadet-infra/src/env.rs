//! Environment variable lookups.
//!
//! Values that are unset, empty, or not valid Unicode are all treated as
//! missing.

use secrecy::SecretString;

use cadet_types::error::ChatError;

/// Server SDK key for the flag service. Required.
pub const SERVER_KEY_VAR: &str = "DEVCYCLE_SERVER_SDK_KEY";

/// Read `name`, returning `None` when it is unset, blank, or not Unicode.
pub fn read_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        Ok(_) => None,
        Err(std::env::VarError::NotPresent) => None,
        // Present but not valid Unicode: cannot be used as a header value.
        Err(std::env::VarError::NotUnicode(_)) => None,
    }
}

/// Read a required variable as a secret.
///
/// # Errors
///
/// [`ChatError::ConfigurationMissing`] naming the variable.
pub fn read_required(name: &str) -> Result<SecretString, ChatError> {
    read_var(name)
        .map(SecretString::from)
        .ok_or_else(|| ChatError::ConfigurationMissing(name.to_string()))
}

/// The flag-service server key from [`SERVER_KEY_VAR`].
pub fn require_server_key() -> Result<SecretString, ChatError> {
    read_required(SERVER_KEY_VAR)
}
