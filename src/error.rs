// Error taxonomy for the toolkit
//
// Only two things are errors: the region table being unusable, and callers
// passing arguments of the wrong shape. A number failing validation is NOT an
// error; see `codec::Validation`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolkitError {
    /// Region data missing, unreadable, corrupt or empty. Fatal for the session.
    #[error("region data unavailable ({path}): {reason}")]
    DataUnavailable { path: String, reason: String },

    /// Argument rejected before any computation happened.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ToolkitError {
    pub fn data_unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        ToolkitError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ToolkitError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
