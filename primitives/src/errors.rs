use thiserror::Error;

use crate::encoding::ChunkNumber;

/// Errors related to KZG verification, SRS handling and erasure decoding.
///
/// Verification outcomes that callers branch on (`ConfigError`, `IndexError`,
/// `ProofInvalid`, `DecodeError`) carry a descriptive message. Batch
/// verification wraps the failure of a single chunk in
/// [`KzgError::ChunkVerification`] so the caller knows which chunk to reject.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum KzgError {
    /// Invalid encoding parameters, configuration or missing SRS material.
    #[error("config error: {0}")]
    ConfigError(String),

    /// A chunk, coset or SRS index outside of the valid range.
    #[error("index error: {0}")]
    IndexError(String),

    /// A pairing check rejected the proof.
    #[error("proof invalid: {0}")]
    ProofInvalid(String),

    /// The erasure coder could not reconstruct the blob.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// A frame whose coefficient count differs from the chunk length.
    #[error("frame has {actual} coefficients, expected {expected}")]
    FrameLengthMismatch { expected: usize, actual: usize },

    /// Failure of one chunk inside a batch.
    #[error("chunk {chunk} at position {position} failed verification: {source}")]
    ChunkVerification {
        position: usize,
        chunk: ChunkNumber,
        #[source]
        source: Box<KzgError>,
    },

    #[error("MSM error: {0}")]
    MsmError(String),

    /// Error related to serialization with a descriptive message.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Error reading SRS material from disk.
    #[error("io error: {0}")]
    IoError(String),

    #[error("not on curve error: {0}")]
    NotOnCurveError(String),

    /// Error related to Fast Fourier Transform (FFT) operations with a descriptive message.
    #[error("FFT error: {0}")]
    FFTError(String),

    /// A generic error with a descriptive message.
    #[error("generic error: {0}")]
    GenericError(String),

    /// Error indicating an invalid input length scenario, typically in data processing.
    #[error("invalid input length")]
    InvalidInputLength,
}

impl KzgError {
    /// The chunk number of a failed batch verification, if any.
    pub fn chunk(&self) -> Option<ChunkNumber> {
        match self {
            KzgError::ChunkVerification { chunk, .. } => Some(*chunk),
            _ => None,
        }
    }

    /// Unwraps batch context down to the error that caused it.
    pub fn root_cause(&self) -> &KzgError {
        match self {
            KzgError::ChunkVerification { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<std::io::Error> for KzgError {
    fn from(err: std::io::Error) -> Self {
        KzgError::IoError(err.to_string())
    }
}
