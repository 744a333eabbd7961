use std::fmt;

use crate::error::{Result, StoreError};

/// The four file classes the store accepts. Variant order is the fixed
/// listing order, so deriving `Ord` gives class-grouped sorting for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileType {
    C,
    Pdf,
    Txt,
    Zip,
}

impl FileType {
    pub fn from_ext(ext: &str) -> Option<FileType> {
        match ext.to_ascii_lowercase().as_str() {
            "c" => Some(FileType::C),
            "pdf" => Some(FileType::Pdf),
            "txt" => Some(FileType::Txt),
            "zip" => Some(FileType::Zip),
            _ => None,
        }
    }

    /// Classify a filename by the extension after its final dot. A name
    /// with no extension, or only a leading dot, has no class.
    pub fn from_filename(name: &str) -> Result<FileType> {
        name.rsplit_once('.')
            .and_then(|(stem, ext)| {
                if stem.is_empty() {
                    None
                } else {
                    Self::from_ext(ext)
                }
            })
            .ok_or_else(|| StoreError::UnsupportedType(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::C => "c",
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
            FileType::Zip => "zip",
        }
    }

    /// The node that owns this class. The table is fixed at build time.
    pub fn backend(self) -> BackendId {
        match self {
            FileType::C => BackendId::N1,
            FileType::Pdf => BackendId::N2,
            FileType::Txt => BackendId::N3,
            FileType::Zip => BackendId::N4,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a node in the fixed four-node layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendId {
    N1,
    N2,
    N3,
    N4,
}

impl BackendId {
    /// The root segment this node owns under its home directory.
    pub fn segment(self) -> &'static str {
        match self {
            BackendId::N1 => "S1",
            BackendId::N2 => "S2",
            BackendId::N3 => "S3",
            BackendId::N4 => "S4",
        }
    }

    pub fn owned_type(self) -> FileType {
        match self {
            BackendId::N1 => FileType::C,
            BackendId::N2 => FileType::Pdf,
            BackendId::N3 => FileType::Txt,
            BackendId::N4 => FileType::Zip,
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendId::N1 => "N1",
            BackendId::N2 => "N2",
            BackendId::N3 => "N3",
            BackendId::N4 => "N4",
        })
    }
}

/// Map a filename to the node that owns its class.
pub fn route(filename: &str) -> Result<BackendId> {
    Ok(FileType::from_filename(filename)?.backend())
}
