//! Error enum
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Csv(csv::Error),
    Http(reqwest::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    Persist(tempfile::PersistError),
    /// Invalid or missing parameter, detected before any work starts.
    Config(String),
    /// A reference was about to be materialized onto an existing path.
    Collision { path: PathBuf },
    /// Two statistics trees hold different node kinds at the same path.
    StatsMismatch { path: String },
    UnknownLabel(String),
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Serde(e) => write!(f, "json error: {}", e),
            Error::Csv(e) => write!(f, "csv error: {}", e),
            Error::Http(e) => write!(f, "http error: {}", e),
            Error::Glob(e) => write!(f, "glob error: {}", e),
            Error::GlobPattern(e) => write!(f, "glob pattern error: {}", e),
            Error::Persist(e) => write!(f, "could not persist file: {}", e),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::Collision { path } => write!(
                f,
                "{:?} already exists. Hint: use the -c/--clear option to clear old corpora beforehand.",
                path
            ),
            Error::StatsMismatch { path } => {
                write!(f, "statistics files disagree on the kind of '{}'", path)
            }
            Error::UnknownLabel(label) => {
                write!(f, "label '{}' is not part of the vocabulary", label)
            }
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Http(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Error {
        Error::Persist(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
