use crate::error::{FlowError, Result};

/// Sanity checks for configuration values.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Rejects empty keys and obvious template placeholders.
    pub fn validate_api_key(api_key: &str) -> Result<()> {
        if api_key.trim().is_empty() {
            return Err(FlowError::Config("API key must not be empty".into()));
        }
        let lower = api_key.to_ascii_lowercase();
        if lower.starts_with("your_") || lower.contains("api_key_here") {
            return Err(FlowError::Config(
                "API key looks like a placeholder; provide a real key".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(FlowError::Config("URL must not be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FlowError::Config(format!(
                "URL `{url}` must start with http:// or https://"
            )));
        }
        Ok(())
    }

    pub fn validate_model_name(model: &str) -> Result<()> {
        if model.trim().is_empty() {
            return Err(FlowError::Config("model name must not be empty".into()));
        }
        if model.chars().any(char::is_whitespace) {
            tracing::warn!(model = %model, "model name contains whitespace");
        }
        Ok(())
    }

    pub fn validate_temperature(temperature: f64) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(FlowError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {temperature}"
            )));
        }
        Ok(())
    }

    pub fn validate_positive(field: &str, value: usize) -> Result<()> {
        if value == 0 {
            return Err(FlowError::Config(format!("`{field}` must be at least 1")));
        }
        Ok(())
    }
}
