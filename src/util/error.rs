//! Error types for retinaparse.

use thiserror::Error;

/// Result alias for retinaparse operations.
pub type RetinaParseResult<T> = std::result::Result<T, RetinaParseError>;

/// Errors that can occur while decoding a single inference result.
///
/// Every error is local to the frame being parsed; the caller drops that
/// frame and moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetinaParseError {
    /// A required output layer is absent from the tensor collection.
    #[error("could not find an output layer called '{name}'")]
    MissingLayer { name: String },
    /// A layer's element count disagrees with the box layer.
    #[error("layer '{layer}' has {got} elements but the box layer has {expected}")]
    CountMismatch {
        layer: String,
        expected: usize,
        got: usize,
    },
    /// A layer reports a record width that does not fit its role.
    #[error("layer '{layer}' has {got} values per record, expected {expected}")]
    RecordLengthMismatch {
        layer: String,
        expected: usize,
        got: usize,
    },
    /// A layer buffer is shorter than its declared element count requires.
    #[error("layer '{layer}' needs {needed} floats but the buffer holds {got}")]
    BufferTooSmall {
        layer: String,
        needed: usize,
        got: usize,
    },
    /// An index is outside the decoded views.
    #[error("index {index} out of bounds for {context} (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
