//! Error types for confidential transaction primitives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Classification of every error the crate can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CtErrorCode {
    /// A required argument was absent.
    NullInput,
    /// A byte or hex length is not one of the permitted sizes.
    InvalidSize,
    /// An argument is present and sized correctly but malformed.
    InvalidArgument,
    /// Hex text could not be decoded.
    InvalidHex,
    /// A precondition on internal flags was violated.
    IllegalState,
    /// The cryptographic engine reported a failure.
    EngineFailure,
    /// Configuration could not be loaded or is invalid.
    ConfigInvalid,
    /// JSON (de)serialization failed.
    SerializationFailed,
    /// Filesystem access failed.
    IoFailure,
}

impl CtErrorCode {
    /// Human readable category of the code
    pub fn category(&self) -> &'static str {
        match self {
            CtErrorCode::NullInput
            | CtErrorCode::InvalidSize
            | CtErrorCode::InvalidArgument
            | CtErrorCode::InvalidHex => "Input",
            CtErrorCode::IllegalState => "State",
            CtErrorCode::EngineFailure => "Cryptographic",
            CtErrorCode::ConfigInvalid => "Configuration",
            CtErrorCode::SerializationFailed => "Serialization",
            CtErrorCode::IoFailure => "I/O",
        }
    }

    /// Whether the error was caused by the caller's data rather than by a
    /// programming error or the environment.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            CtErrorCode::NullInput
                | CtErrorCode::InvalidSize
                | CtErrorCode::InvalidArgument
                | CtErrorCode::InvalidHex
        )
    }
}

/// Extra diagnostic information attached to an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub context: HashMap<String, String>,
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }
}

#[derive(Error, Debug)]
pub enum CtError {
    #[error("Null input: {message}")]
    NullInput { message: String, context: ErrorContext },

    #[error("Invalid size: {message}")]
    InvalidSize { message: String, context: ErrorContext },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String, context: ErrorContext },

    #[error("Illegal state: {message}")]
    IllegalState { message: String, context: ErrorContext },

    #[error("Engine error ({code}): {message}")]
    Engine {
        code: i32,
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config { message: String, context: ErrorContext },

    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtError {
    pub fn null_input(message: &str) -> Self {
        CtError::NullInput {
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_size(message: &str) -> Self {
        CtError::InvalidSize {
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        CtError::InvalidArgument {
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    pub fn illegal_state(message: &str) -> Self {
        CtError::IllegalState {
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    /// Wrap an engine status code and message verbatim.
    pub fn engine(code: i32, message: &str) -> Self {
        CtError::Engine {
            code,
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    pub fn config(message: &str) -> Self {
        CtError::Config {
            message: message.to_string(),
            context: ErrorContext::new(),
        }
    }

    /// Get the classification code of this error
    pub fn code(&self) -> CtErrorCode {
        match self {
            CtError::NullInput { .. } => CtErrorCode::NullInput,
            CtError::InvalidSize { .. } => CtErrorCode::InvalidSize,
            CtError::InvalidArgument { .. } => CtErrorCode::InvalidArgument,
            CtError::IllegalState { .. } => CtErrorCode::IllegalState,
            CtError::Engine { .. } => CtErrorCode::EngineFailure,
            CtError::Config { .. } => CtErrorCode::ConfigInvalid,
            CtError::Hex(_) => CtErrorCode::InvalidHex,
            CtError::Json(_) => CtErrorCode::SerializationFailed,
            CtError::Io(_) => CtErrorCode::IoFailure,
        }
    }

    /// Get the attached context, if this variant carries one
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CtError::NullInput { context, .. }
            | CtError::InvalidSize { context, .. }
            | CtError::InvalidArgument { context, .. }
            | CtError::IllegalState { context, .. }
            | CtError::Engine { context, .. }
            | CtError::Config { context, .. } => Some(context),
            CtError::Hex(_) | CtError::Json(_) | CtError::Io(_) => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            CtError::NullInput { context, .. }
            | CtError::InvalidSize { context, .. }
            | CtError::InvalidArgument { context, .. }
            | CtError::IllegalState { context, .. }
            | CtError::Engine { context, .. }
            | CtError::Config { context, .. } => Some(context),
            CtError::Hex(_) | CtError::Json(_) | CtError::Io(_) => None,
        }
    }

    /// Attach a key/value pair. Wrapped foreign errors carry no context and
    /// are returned unchanged.
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        if let Some(context) = self.context_mut() {
            context.context.insert(key.to_string(), value.to_string());
        }
        self
    }

    /// Record the operation that was running when the error was raised.
    pub fn with_operation(mut self, operation: &str) -> Self {
        if let Some(context) = self.context_mut() {
            context.operation = Some(operation.to_string());
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, CtError>;
