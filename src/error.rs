use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnoseError {
    /// The signal cannot be analyzed at all. Callers may retry with another file.
    #[error("unusable audio: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid analysis configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl DiagnoseError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DiagnoseError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        DiagnoseError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
