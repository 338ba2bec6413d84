use std::path::PathBuf;

/// The primary error type for all operations in the `tardelta` crate.
#[derive(Debug)]
pub enum DiffError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// An input archive could not be opened or enumerated. Fatal before any
    /// diff output is produced.
    Archive { msg: String, path: PathBuf },

    /// The delta archive could not be created or written. The diagnostic
    /// report has already been emitted when this is raised.
    Output { source: std::io::Error, path: PathBuf },

    /// A wrapper for any other error that doesn't fit the specific variants.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for DiffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            DiffError::Archive { msg, path } => write!(f, "Cannot read archive '{}': {}", path.display(), msg),
            DiffError::Output { source, path } => write!(f, "Cannot write output archive '{}': {}", path.display(), source),
            DiffError::Other(e) => write!(f, "An unexpected error occurred: {}", e),
        }
    }
}

impl std::error::Error for DiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiffError::Io { source, .. } => Some(source),
            DiffError::Output { source, .. } => Some(source),
            DiffError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

// Generic IO error conversion that doesn't require a path
impl From<std::io::Error> for DiffError {
    fn from(err: std::io::Error) -> Self {
        DiffError::Io { source: err, path: PathBuf::new() } // Generic path
    }
}

impl DiffError {
    /// Attaches a path to a bare I/O error, leaving other variants untouched.
    pub fn with_path(self, path: &std::path::Path) -> Self {
        match self {
            DiffError::Io { source, path: p } if p.as_os_str().is_empty() => {
                DiffError::Io { source, path: path.to_path_buf() }
            }
            other => other,
        }
    }
}
