use std::fmt::{self, Display, Formatter};

/// Error codes reported by the store.
///
/// Non-exhaustive: later versions may report codes this list does not carry
/// yet, and callers outside this crate must be prepared for them.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Aborted,
    PermissionDenied,
    Unavailable,
    ResourceExhausted,
    Internal,
}

impl ErrorCode {
    pub fn code_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "memstore/invalid-argument",
            ErrorCode::NotFound => "memstore/not-found",
            ErrorCode::AlreadyExists => "memstore/already-exists",
            ErrorCode::Aborted => "memstore/aborted",
            ErrorCode::PermissionDenied => "memstore/permission-denied",
            ErrorCode::Unavailable => "memstore/unavailable",
            ErrorCode::ResourceExhausted => "memstore/resource-exhausted",
            ErrorCode::Internal => "memstore/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code_str(), self.message)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

pub fn invalid_argument(message: impl Into<String>) -> Error {
    Error::new(ErrorCode::InvalidArgument, message)
}

pub fn not_found(message: impl Into<String>) -> Error {
    Error::new(ErrorCode::NotFound, message)
}

pub fn resource_exhausted(message: impl Into<String>) -> Error {
    Error::new(ErrorCode::ResourceExhausted, message)
}

pub fn internal_error(message: impl Into<String>) -> Error {
    Error::new(ErrorCode::Internal, message)
}
