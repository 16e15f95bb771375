//! Function environment variables.

use crate::runtime::Runtime;
use std::collections::BTreeMap;
use thiserror::Error;

/// Stable error codes for environment validation.
pub mod codes {
    pub const ENV_RESERVED_KEY: &str = "ENV_RESERVED_KEY";
    pub const ENV_KEY_INVALID: &str = "ENV_KEY_INVALID";
}

/// Makes the v2 AWS SDK keep HTTP connections alive between invocations.
pub const CONNECTION_REUSE_VAR: &str = "AWS_NODEJS_CONNECTION_REUSE_ENABLED";

/// Keys the serverless runtime sets itself.
pub const RESERVED_KEYS: &[&str] = &[
    "_HANDLER",
    "_X_AMZN_TRACE_ID",
    "AWS_ACCESS_KEY",
    "AWS_ACCESS_KEY_ID",
    "AWS_DEFAULT_REGION",
    "AWS_EXECUTION_ENV",
    "AWS_LAMBDA_FUNCTION_MEMORY_SIZE",
    "AWS_LAMBDA_FUNCTION_NAME",
    "AWS_LAMBDA_FUNCTION_VERSION",
    "AWS_LAMBDA_INITIALIZATION_TYPE",
    "AWS_LAMBDA_LOG_GROUP_NAME",
    "AWS_LAMBDA_LOG_STREAM_NAME",
    "AWS_LAMBDA_RUNTIME_API",
    "AWS_REGION",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "LAMBDA_RUNTIME_DIR",
    "LAMBDA_TASK_ROOT",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("{key} environment variable is reserved by the lambda runtime")]
    ReservedKey { key: String },

    #[error("environment variable name is invalid: {key:?}")]
    InvalidKey { key: String },
}

impl EnvironmentError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReservedKey { .. } => codes::ENV_RESERVED_KEY,
            Self::InvalidKey { .. } => codes::ENV_KEY_INVALID,
        }
    }
}

/// Validate user variables and add runtime defaults.
///
/// The connection-reuse variable is only added for runtimes that still ship
/// the v2 SDK, and never overrides a value the user set.
///
/// # Errors
/// Returns an error for reserved or malformed keys.
pub fn build_environment(
    user: &BTreeMap<String, String>,
    runtime: &Runtime,
    aws_sdk_connection_reuse: bool,
) -> Result<BTreeMap<String, String>, EnvironmentError> {
    for key in user.keys() {
        if !is_valid_key(key) {
            return Err(EnvironmentError::InvalidKey { key: key.clone() });
        }
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(EnvironmentError::ReservedKey { key: key.clone() });
        }
    }

    let mut env = user.clone();
    if aws_sdk_connection_reuse && !runtime.bundles_sdk_v3() {
        env.entry(CONNECTION_REUSE_VAR.to_string())
            .or_insert_with(|| "1".to_string());
    }
    Ok(env)
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt(name: &str) -> Runtime {
        name.parse().unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_connection_reuse_added_for_sdk_v2_runtime() {
        let env = build_environment(&BTreeMap::new(), &rt("nodejs16.x"), true).unwrap();
        assert_eq!(env.get(CONNECTION_REUSE_VAR).map(String::as_str), Some("1"));
    }

    #[test]
    fn test_connection_reuse_added_for_legacy_runtime() {
        let env = build_environment(&BTreeMap::new(), &rt("nodejs8.10"), true).unwrap();
        assert_eq!(env.get(CONNECTION_REUSE_VAR).map(String::as_str), Some("1"));
    }

    #[test]
    fn test_connection_reuse_skipped_for_sdk_v3_runtime() {
        for name in ["nodejs18.x", "nodejs20.x", "nodejs22.x"] {
            let env = build_environment(&BTreeMap::new(), &rt(name), true).unwrap();
            assert!(!env.contains_key(CONNECTION_REUSE_VAR), "{name}");
        }
    }

    #[test]
    fn test_connection_reuse_can_be_disabled() {
        let env = build_environment(&BTreeMap::new(), &rt("nodejs16.x"), false).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn test_user_value_not_overridden() {
        let user = vars(&[(CONNECTION_REUSE_VAR, "0"), ("TABLE_NAME", "orders")]);
        let env = build_environment(&user, &rt("nodejs16.x"), true).unwrap();
        assert_eq!(env.get(CONNECTION_REUSE_VAR).map(String::as_str), Some("0"));
        assert_eq!(env.get("TABLE_NAME").map(String::as_str), Some("orders"));
    }

    #[test]
    fn test_reserved_key_rejected() {
        let err = build_environment(&vars(&[("AWS_REGION", "eu-west-1")]), &rt("nodejs20.x"), true)
            .unwrap_err();
        assert_eq!(err.code(), codes::ENV_RESERVED_KEY);
        assert!(err.to_string().contains("AWS_REGION"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        for key in ["", "1ABC", "MY-VAR", "A B"] {
            let err = build_environment(&vars(&[(key, "x")]), &rt("nodejs20.x"), true).unwrap_err();
            assert_eq!(err.code(), codes::ENV_KEY_INVALID, "{key:?}");
        }
    }
}
