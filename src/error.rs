//! Error kinds raised while loading schemas or transcoding values.
//!
//! Failures are terminal: no codec operation in this crate retries or
//! recovers, and no partial output is ever handed back. The only in-flight
//! transformation applied to an error is the attachment of the schema path
//! at which encoding stopped (see [`Error`]), so a caller always receives a
//! single one-line message of the form `path.to.field[3]: cause`.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The closed set of failure causes.
///
/// Every variant corresponds to a distinct class of bad input; none of them
/// indicate a bug in the library itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The JSON document, a numeric token, or a hex string is ill-formed.
    #[error("{0}")]
    Parse(String),

    /// The JSON event is not one the schema node being encoded can accept.
    #[error("expected {0}")]
    TypeMismatch(&'static str),

    /// A numeric value overflows its target width, or a hex string has the
    /// wrong length for its target.
    #[error("{0}")]
    OutOfRange(String),

    /// A type name that neither the ABI nor the built-in catalog declares.
    #[error("unknown type \"{0}\"")]
    UnknownType(String),

    /// An object key past the end of the declared field list.
    #[error("unexpected field \"{0}\"")]
    UnknownField(String),

    /// A declared field that the document did not supply next in order.
    #[error("expected field \"{0}\"")]
    MissingField(String),

    /// An ABI document that declares the same type name twice, or shadows a
    /// built-in.
    #[error("abi redefines type \"{0}\"")]
    DuplicateType(String),

    /// A tag byte outside its valid set: an optional prefix other than
    /// `0` / `1`, or an unassigned key-algorithm discriminant.
    #[error("invalid tag byte 0x{0:02x}")]
    InvalidTag(u8),

    /// The binary input ended before the schema was satisfied.
    #[error("read past end")]
    EndOfInput,

    /// A depth cap was hit: 32 while resolving the schema, 128 while
    /// walking a document.
    #[error("recursion limit reached")]
    RecursionLimit,

    /// A synthetic type of the shape `T??`, `T?[]`, `T[]?` or `T[][]`.
    #[error("optional and array don't support nesting")]
    NestedOptionalOrArray,
}

/// A terminal codec failure, optionally annotated with the schema path at
/// which the JSON→binary engine stopped.
///
/// The path is only available for encoding failures; schema loading and
/// binary decoding surface the bare [`ErrorKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    path: Option<String>,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn with_path(path: String, kind: ErrorKind) -> Self {
        let path = if path.is_empty() { None } else { Some(path) };
        Error { path, kind }
    }

    /// The failure cause.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The dotted struct/field/array path at which encoding failed, when the
    /// failure happened below the document root.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { path: None, kind }
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(err: serde_json::Error) -> Self {
        ErrorKind::Parse(err.to_string())
    }
}
