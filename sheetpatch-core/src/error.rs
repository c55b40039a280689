//! Error types for sheetpatch.

use thiserror::Error;

/// Errors raised while opening, editing, or saving a package.
#[derive(Debug, Error)]
pub enum SheetpatchError {
    /// A column/row pair or reference string that does not name a cell.
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// A required or referenced part is absent from the package or cannot be parsed.
    #[error("Missing or unreadable part '{part}': {reason}")]
    MissingPart { part: String, reason: String },

    /// A relationship id has no entry in the manifest it was looked up in.
    #[error("Relationship '{id}' not found in '{manifest}'")]
    UnresolvedRelationship { manifest: String, id: String },

    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive failure.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML in a part that is not subject to the missing-part policy.
    #[error("XML error in '{part}': {message}")]
    Xml { part: String, message: String },

    /// A value that cannot be stored in a cell.
    #[error("Invalid cell value: {0}")]
    InvalidValue(String),

    /// An entry that the overwrite policy refuses to replace.
    #[error("Part already exists: {0}")]
    PartExists(String),

    /// No worksheet with the requested name or index.
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),
}

impl SheetpatchError {
    pub(crate) fn missing_part(part: impl Into<String>, reason: impl ToString) -> Self {
        SheetpatchError::MissingPart {
            part: part.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn xml(part: impl Into<String>, message: impl ToString) -> Self {
        SheetpatchError::Xml {
            part: part.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for sheetpatch operations.
pub type Result<T> = std::result::Result<T, SheetpatchError>;
