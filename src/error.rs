use std::path::PathBuf;

use burn::record::RecorderError;
use thiserror::Error;

/// Failures the inference pipeline can report. Everything else (strokes
/// outside the canvas, an empty drawing) is not an error condition.
#[derive(Debug, Error)]
pub enum Error {
    /// The weights artifact is missing, unreadable, or its tensors do not
    /// match the declared topology. Fatal at startup.
    #[error("failed to load network weights from {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: RecorderError,
    },

    /// A predicted class index fell outside the vocabulary. Unreachable with
    /// a correctly shaped output layer.
    #[error("class index {index} outside the {len}-label vocabulary")]
    Index { index: usize, len: usize },
}
