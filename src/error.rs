use std::fmt;

/// Failure classes surfaced to the user. Every library error maps onto one
/// of these so the session can word its notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    MalformedInput,
    MalformedSourceFile,
    MissingDirectory,
    PersistenceFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::MalformedInput => "malformed-input",
            ErrorKind::MalformedSourceFile => "malformed-source-file",
            ErrorKind::MissingDirectory => "missing-directory",
            ErrorKind::PersistenceFailure => "persistence-failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl crate::tree::TreeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::NotFound
    }
}

impl crate::ingest::IngestError {
    pub fn kind(&self) -> ErrorKind {
        use crate::ingest::IngestError;
        match self {
            IngestError::MissingDirectory { .. } | IngestError::UnreadableDirectory { .. } => {
                ErrorKind::MissingDirectory
            }
            IngestError::MalformedSourceFile { .. } | IngestError::Pattern(_) => {
                ErrorKind::MalformedSourceFile
            }
            IngestError::Persistence { .. } | IngestError::WorkerLost => {
                ErrorKind::PersistenceFailure
            }
        }
    }
}
