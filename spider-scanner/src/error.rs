use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported image extension: {0}")]
    UnsupportedExtension(String),

    #[error("No filename in URL path: {0}")]
    MissingFilename(String),
}

/// Broad failure classes. Every one of them is recovered from locally; the
/// crawl just skips the unit of work that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Parse,
    Filesystem,
    Validation,
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::HttpError(e) if e.is_decode() => ErrorKind::Parse,
            ScanError::HttpError(_) | ScanError::Status { .. } => ErrorKind::Network,
            ScanError::ParseError(_) => ErrorKind::Parse,
            ScanError::IoError(_) => ErrorKind::Filesystem,
            ScanError::InvalidUrl(_)
            | ScanError::UnsupportedExtension(_)
            | ScanError::MissingFilename(_) => ErrorKind::Validation,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::Validation => "validation",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
