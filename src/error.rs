use std::fmt;
use std::io;

use crate::wire;

/// Every failure class the store reports, on either side of the wire.
///
/// Backend responses carry a status keyword; `status` maps a local error to
/// the keyword its response frame carries. The front door relays backend
/// error frames verbatim instead of reconstructing them.
#[derive(Debug)]
pub enum StoreError {
    /// Command line failed validation; nothing was sent.
    MalformedCommand(String),
    /// File extension is not in the routing table.
    UnsupportedType(String),
    /// Archive requested for a type that cannot be archived here.
    UnsupportedArchive(String),
    /// Absolute path not anchored at a recognized root segment.
    MalformedPath(String),
    /// Target file or directory absent on the owning node.
    NotFound(String),
    Io(io::Error),
    /// Dial failed, or a backend connection dropped mid-exchange.
    Unavailable(String),
    /// Declared payload length not satisfied before EOF.
    Truncated,
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// The wire status keyword a response frame carries for this error.
    pub fn status(&self) -> &'static str {
        match self {
            StoreError::MalformedCommand(_)
            | StoreError::UnsupportedType(_)
            | StoreError::UnsupportedArchive(_)
            | StoreError::MalformedPath(_) => wire::STATUS_UNSUPPORTED,
            StoreError::NotFound(_) => wire::STATUS_NOTFOUND,
            StoreError::Io(_) => wire::STATUS_IOERROR,
            StoreError::Unavailable(_) => wire::STATUS_UNAVAILABLE,
            StoreError::Truncated => wire::STATUS_TRUNCATED,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MalformedCommand(msg) => write!(f, "malformed command: {}", msg),
            StoreError::UnsupportedType(name) => write!(f, "unsupported file type: {}", name),
            StoreError::UnsupportedArchive(name) => {
                write!(f, "archive not supported for: {}", name)
            }
            StoreError::MalformedPath(path) => write!(f, "malformed path: {}", path),
            StoreError::NotFound(path) => write!(f, "not found: {}", path),
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Unavailable(msg) => write!(f, "backend unavailable: {}", msg),
            StoreError::Truncated => write!(f, "frame truncated"),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}
