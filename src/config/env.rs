use std::env;

use crate::error::{FlowError, Result};

pub const DEBUG_ENV: &str = "NEEDSFLOW_DEBUG";

/// Environment lookups for configuration values.
pub struct EnvConfig;

impl EnvConfig {
    fn placeholder(value: &str) -> Option<&str> {
        value
            .trim()
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
    }

    /// Resolves `${VAR}` from the environment; any other value is returned
    /// as-is. An unset variable is an error.
    pub fn resolve(value: &str) -> Result<String> {
        match Self::placeholder(value) {
            Some(name) => Self::get_env(name),
            None => Ok(value.to_string()),
        }
    }

    /// Like [`EnvConfig::resolve`], but unset variables and empty values
    /// resolve to `None`.
    pub fn resolve_optional(value: &str) -> Option<String> {
        let resolved = match Self::placeholder(value) {
            Some(name) => Self::get_env_optional(name)?,
            None => value.to_string(),
        };
        let resolved = resolved.trim().to_string();
        (!resolved.is_empty()).then_some(resolved)
    }

    pub fn is_placeholder(value: &str) -> bool {
        Self::placeholder(value).is_some()
    }

    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| {
            FlowError::Config(format!(
                "environment variable `{key}` is not set"
            ))
        })
    }

    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_values_pass_through() {
        assert_eq!(EnvConfig::resolve("literal-key").unwrap(), "literal-key");
        assert_eq!(
            EnvConfig::resolve_optional(" literal-key ").as_deref(),
            Some("literal-key")
        );
    }

    #[test]
    fn placeholders_read_the_environment() {
        env::set_var("NEEDSFLOW_TEST_KEY", "from-env");
        assert_eq!(EnvConfig::resolve("${NEEDSFLOW_TEST_KEY}").unwrap(), "from-env");
        env::remove_var("NEEDSFLOW_TEST_KEY");
        assert!(EnvConfig::resolve("${NEEDSFLOW_TEST_KEY}").is_err());
        assert_eq!(EnvConfig::resolve_optional("${NEEDSFLOW_TEST_KEY}"), None);
    }

    #[test]
    fn empty_values_are_unconfigured() {
        assert_eq!(EnvConfig::resolve_optional(""), None);
    }
}
