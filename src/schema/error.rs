use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema `{0}` not registered")]
    NotRegistered(String),
    #[error("schema validation failed at `{}`: {message}", display_path(.path))]
    Validation { message: String, path: Vec<String> },
}

impl SchemaError {
    pub(crate) fn at(path: &[String], message: impl Into<String>) -> Self {
        SchemaError::Validation {
            message: message.into(),
            path: path.to_vec(),
        }
    }

    /// Name of the offending field, if the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::Validation { path, .. } => path
                .iter()
                .rev()
                .find(|segment| segment.parse::<usize>().is_err())
                .map(String::as_str),
            SchemaError::NotRegistered(_) => None,
        }
    }

    pub fn path(&self) -> &[String] {
        match self {
            SchemaError::Validation { path, .. } => path,
            SchemaError::NotRegistered(_) => &[],
        }
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.join(".")
    }
}
