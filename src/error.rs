//! Error types.
//!
//! Nothing here is fatal to rendering: a [`LoadError`] still leaves the
//! document holding a renderable error page, and an [`ImageError`] only
//! causes the image to be skipped.

use thiserror::Error;

/// Failure to obtain a document's raw text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not load {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to decode an inline image reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image header truncated ({0} bytes)")]
    TruncatedHeader(usize),
    #[error("image has zero dimension ({width}x{height})")]
    EmptyDimension { width: i32, height: i32 },
    #[error("image pixel data too short: need {needed} bytes, have {actual}")]
    ShortPixelData { needed: usize, actual: usize },
    #[error("external image could not be opened: {0}")]
    Unavailable(String),
}
