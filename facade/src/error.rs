use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Error codes surfaced by the neutral contract.
///
/// Most codes are forwarded verbatim from whichever native SDK sits behind
/// the adapter; the first two originate in the adapter layer itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FirestoreErrorCode {
    /// A neutral object handed to an adapter was not produced by that adapter.
    UnsupportedImplementation,
    /// A native enum carried a value this adapter does not know how to map.
    UnrecognizedEnumValue,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Aborted,
    PermissionDenied,
    Unavailable,
    ResourceExhausted,
    Internal,
}

impl FirestoreErrorCode {
    pub fn code_str(&self) -> &'static str {
        match self {
            FirestoreErrorCode::UnsupportedImplementation => {
                "firestore/unsupported-implementation"
            }
            FirestoreErrorCode::UnrecognizedEnumValue => "firestore/unrecognized-enum-value",
            FirestoreErrorCode::InvalidArgument => "firestore/invalid-argument",
            FirestoreErrorCode::NotFound => "firestore/not-found",
            FirestoreErrorCode::AlreadyExists => "firestore/already-exists",
            FirestoreErrorCode::Aborted => "firestore/aborted",
            FirestoreErrorCode::PermissionDenied => "firestore/permission-denied",
            FirestoreErrorCode::Unavailable => "firestore/unavailable",
            FirestoreErrorCode::ResourceExhausted => "firestore/resource-exhausted",
            FirestoreErrorCode::Internal => "firestore/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirestoreError {
    code: FirestoreErrorCode,
    message: String,
}

impl FirestoreError {
    pub fn new(code: FirestoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> FirestoreErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FirestoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code_str(), self.message)
    }
}

impl Error for FirestoreError {}

pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// The object behind a neutral trait does not belong to the active adapter.
pub fn unsupported_implementation(interface: &str) -> FirestoreError {
    FirestoreError::new(
        FirestoreErrorCode::UnsupportedImplementation,
        format!("{interface} implementation was not created by this adapter"),
    )
}

/// A native enum value has no neutral counterpart in this adapter version.
pub fn unrecognized_enum_value(enum_name: &str, value: impl Display) -> FirestoreError {
    FirestoreError::new(
        FirestoreErrorCode::UnrecognizedEnumValue,
        format!("unrecognized {enum_name} value: {value}"),
    )
}

pub fn invalid_argument(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::InvalidArgument, message)
}

pub fn not_found(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::NotFound, message)
}

pub fn internal_error(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::Internal, message)
}
