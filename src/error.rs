//! Unified error type for store and cart operations.

/// Things that can go wrong when reading or mutating the catalog.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backing storage could not be read or written (permissions, disk, rename).
    Unavailable(String),
    /// Backing content exists but isn't a valid serialized collection.
    Malformed(String),
    /// Failed to serialize the collection to bytes.
    Serialize(String),
    /// The operation targeted an id that isn't in the store.
    NotFound(String),
    /// Field values rejected before touching storage (blank title, negative price).
    Invalid(String),
    /// Bad configuration (empty path, path is a directory, etc.).
    Config(String),
    /// The record was deleted but a subscribed observer failed to follow up.
    Cascade(String),
}

impl Error {
    /// `true` for [`Error::NotFound`]. Handy when choosing between a redirect
    /// and an error page.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            Error::Malformed(msg) => write!(f, "malformed data: {msg}"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::NotFound(id) => write!(f, "no record with id {id}"),
            Error::Invalid(msg) => write!(f, "invalid record: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Cascade(msg) => write!(f, "delete cascade failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Unavailable(err.to_string())
        } else if err.is_syntax() || err.is_eof() || err.is_data() {
            Error::Malformed(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
