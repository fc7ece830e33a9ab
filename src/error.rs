//! Common error type and result alias.
use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported file type '{0}'. Please upload a PNG, JPEG, or WEBP image.")]
    UnsupportedType(String),
    #[error("Please provide an image first.")]
    MissingImage,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Encoding(std::io::Error),

    #[error("{0}")]
    Generation(String),

    #[error("A generation request is already in flight.")]
    InFlight,

    #[error("Prompt construction error: {0}")]
    PromptConstruction(String),

    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl AppError {
    /// Message for the inline error panel, with the generic fallback for
    /// failures that carry nothing to say.
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            msg
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
