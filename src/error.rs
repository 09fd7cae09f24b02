use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::charset::Charset;

pub type Result<T> = std::result::Result<T, StripError>;

/// Errors raised while turning one input into its normalized output.
#[derive(Debug, Error)]
pub enum StripError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failure on a stream with no known path.
    #[error("stream I/O error: {0}")]
    Stream(#[from] io::Error),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl StripError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StripError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach `path` to a stream-level failure.
    pub fn at(self, path: &Path) -> Self {
        match self {
            StripError::Stream(source) => StripError::io(path, source),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("input is not valid {charset} at byte offset {offset}")]
    Malformed { charset: Charset, offset: usize },

    #[error("character {ch:?} cannot be represented in {charset}")]
    Unmappable { charset: Charset, ch: char },

    #[error("unsupported charset: {0}")]
    UnknownCharset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_attaches_path_to_stream_errors_only() {
        let err = StripError::Stream(io::Error::other("disk full")).at(Path::new("out/A.java"));
        assert!(matches!(&err, StripError::Io { path, .. } if path == Path::new("out/A.java")));
        assert!(err.to_string().contains("out/A.java"));

        let enc = StripError::from(EncodingError::UnknownCharset("x".into())).at(Path::new("a"));
        assert!(matches!(enc, StripError::Encoding(_)));
    }
}
