//! Errors from loading configuration.

/// Errors that can occur while building configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing required environment variable {name}")]
    MissingVar {
        /// Variable name
        name: &'static str,
    },

    /// A variable is set but cannot be parsed.
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable name
        name: String,
        /// The raw value
        value: String,
    },
}
