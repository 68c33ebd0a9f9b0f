use std::fmt;
use std::io;
use thiserror::Error as ThisError;

///
/// BlueCrabError
/// Structured runtime error with a stable class/origin classification.
///

#[derive(Debug, ThisError)]
#[error("{origin}:{class}: {message}")]
pub struct BlueCrabError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl BlueCrabError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    pub fn invalid_arg(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidArg, origin, message)
    }

    pub fn not_found(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, origin, message)
    }

    pub fn conflict(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, origin, message)
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corrupt, ErrorOrigin::Codec, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::TypeMismatch, ErrorOrigin::Codec, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }
}

impl From<io::Error> for BlueCrabError {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorClass::Io, ErrorOrigin::Codec, err.to_string())
    }
}

///
/// ErrorClass
/// Closed error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArg,
    NotFound,
    Conflict,
    Io,
    Corrupt,
    TypeMismatch,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArg => "invalid_arg",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Io => "io",
            Self::Corrupt => "corrupt",
            Self::TypeMismatch => "type_mismatch",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Value,
    Hash,
    Store,
    Pattern,
    Commit,
    Branch,
    Tag,
    Diff,
    Merge,
    Codec,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Value => "value",
            Self::Hash => "hash",
            Self::Store => "store",
            Self::Pattern => "pattern",
            Self::Commit => "commit",
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::Diff => "diff",
            Self::Merge => "merge",
            Self::Codec => "codec",
        };
        write!(f, "{label}")
    }
}

pub type Result<T> = std::result::Result<T, BlueCrabError>;
