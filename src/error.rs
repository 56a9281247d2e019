use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A filter value outside its legal set, or a malformed offset.
    #[error("unrecognized {parameter} value: '{value}'\nvalid {parameter} values are {expected}")]
    InvalidArgument {
        parameter: String,
        value: String,
        expected: String,
    },

    #[error("no such {kind} uuid found: '{id}'")]
    NotFound { kind: &'static str, id: String },

    /// The store could not be opened or a statement failed against it.
    #[error("could not query the database at: {}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unreadable database version: {0}")]
    Version(#[from] plist::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Storage and decode failures mean the store itself is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Decode(_) | Self::Version(_))
    }
}
