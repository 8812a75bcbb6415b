// Library error types for registry and summary operations

use std::fmt;

/// One or more business-rule violations detected before persistence.
///
/// Displays as the messages joined with ", " so callers that only print the
/// error still see every violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self { messages: vec![message.into()] }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if any message contains `needle` (case-insensitive)
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.messages.iter().any(|m| m.to_lowercase().contains(&needle))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join(", "))
    }
}

/// Errors surfaced by the configuration model
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ConfigError::NotFound { entity, id: id.to_string() }
    }

    /// Wrap a list of violations; an empty list is not an error
    pub fn check(messages: Vec<String>) -> Result<()> {
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(ValidationErrors::new(messages)))
        }
    }

    /// Errors caused by user input (as opposed to store or I/O failures)
    pub fn is_user_error(&self) -> bool {
        matches!(self, ConfigError::Validation(_) | ConfigError::NotFound { .. })
    }

    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            ConfigError::Validation(errors) => Some(errors.messages()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
