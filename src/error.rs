use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the recognition pipeline.
///
/// Only structural failures are fatal. Poor recognition quality (no staves,
/// no symbols, unmappable pitches) degrades to an empty or partial score
/// instead of erroring.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("failed to load image {path:?}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("symbol classifier failed: {0}")]
    Classifier(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RecognitionError>;
