//! Domain Errors

use std::io;
use thiserror::Error;

/// Failures while turning a raw buffer into a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request line {line:?}")]
    MalformedRequestLine { line: String },
    #[error("unsupported verb {verb:?}")]
    UnsupportedVerb { verb: String },
    #[error("unsupported version {version:?}")]
    UnsupportedVersion { version: String },
    #[error("malformed header line {line:?}")]
    MalformedHeader { line: String },
    #[error("malformed query string {query:?}")]
    MalformedQueryString { query: String },
    #[error("no body found")]
    NoBodyFound,
    #[error("path {path:?} has no segment after its prefix")]
    MalformedPath { path: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file {filename:?} not found")]
    NotFound {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("i/o error on file {filename:?}")]
    Io {
        filename: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub fn from_io(filename: &str, source: io::Error) -> Self {
        let filename = filename.to_owned();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { filename, source },
            _ => Self::Io { filename, source },
        }
    }
}

#[derive(Debug, Error)]
#[error("gzip compression failed")]
pub struct CompressionError(#[from] pub io::Error);

/// Everything a route handler can fail with.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("reading from storage")]
    Read(#[source] StorageError),
    #[error("writing to storage")]
    Write(#[source] StorageError),
    #[error(transparent)]
    Compression(#[from] CompressionError),
}
