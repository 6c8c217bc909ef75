//! Error types for image construction

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Image builder error types
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Payload source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image sink unavailable: {}", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Payload ended early (expected {expected} bytes, copied {copied})")]
    ShortPayload { expected: u64, copied: u64 },

    #[error("Image too large ({sectors} sectors, header limit is {})", u16::MAX)]
    ImageTooLarge { sectors: u64 },

    #[error("Truncated image header ({len} bytes)")]
    TruncatedHeader { len: usize },

    #[error("Invalid image header: {0}")]
    InvalidHeader(&'static str),
}

pub type Result<T> = core::result::Result<T, ImageError>;
