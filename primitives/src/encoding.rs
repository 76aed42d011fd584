use ark_bn254::{Fr, G1Affine, G2Affine};
use serde::{Deserialize, Serialize};

use crate::{
    consts::{BYTES_PER_FIELD_ELEMENT, MAX_LOG2_EVALUATIONS},
    errors::KzgError,
};

/// Position of a chunk in the encoded blob, in `0..num_chunks`.
pub type ChunkNumber = u64;

/// Shape of an encoded blob: `num_chunks` chunks of `chunk_length`
/// evaluations each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodingParams {
    pub chunk_length: u64,
    pub num_chunks: u64,
}

impl EncodingParams {
    pub fn new(chunk_length: u64, num_chunks: u64) -> Self {
        Self {
            chunk_length,
            num_chunks,
        }
    }

    /// Smallest power-of-two parameters covering the given minimums.
    pub fn from_mins(min_chunk_length: u64, min_num_chunks: u64) -> Self {
        Self {
            chunk_length: min_chunk_length.max(1).next_power_of_two(),
            num_chunks: min_num_chunks.max(1).next_power_of_two(),
        }
    }

    /// Parameters for spreading `data_size` bytes over `num_sys` systematic
    /// chunks, extended with `num_par` parity chunks.
    pub fn from_sys_par(num_sys: u64, num_par: u64, data_size: u64) -> Self {
        let data_len = data_size.div_ceil(BYTES_PER_FIELD_ELEMENT as u64);
        let chunk_length = data_len.div_ceil(num_sys.max(1));
        Self::from_mins(chunk_length, num_sys + num_par)
    }

    /// Total number of evaluations, `chunk_length * num_chunks`.
    pub fn num_evaluations(&self) -> u64 {
        self.chunk_length.saturating_mul(self.num_chunks)
    }

    /// Minimum number of distinct chunks from which a payload of
    /// `data_size` bytes can be decoded.
    pub fn num_sys(&self, data_size: u64) -> u64 {
        data_size
            .div_ceil(BYTES_PER_FIELD_ELEMENT as u64)
            .div_ceil(self.chunk_length.max(1))
    }

    pub fn validate(&self) -> Result<(), KzgError> {
        if self.chunk_length == 0 || self.num_chunks == 0 {
            return Err(KzgError::ConfigError(format!(
                "chunk length {} and number of chunks {} must be positive",
                self.chunk_length, self.num_chunks
            )));
        }
        if !self.chunk_length.is_power_of_two() {
            return Err(KzgError::ConfigError(format!(
                "chunk length must be a power of 2, got {}",
                self.chunk_length
            )));
        }
        if !self.num_chunks.is_power_of_two() {
            return Err(KzgError::ConfigError(format!(
                "number of chunks must be a power of 2, got {}",
                self.num_chunks
            )));
        }
        let num_evaluations = self.num_evaluations();
        if num_evaluations > 1u64 << MAX_LOG2_EVALUATIONS {
            return Err(KzgError::ConfigError(format!(
                "number of evaluations {} exceeds 2^{}",
                num_evaluations, MAX_LOG2_EVALUATIONS
            )));
        }
        Ok(())
    }
}

/// One chunk of an encoded blob: the coefficients of the interpolation
/// polynomial of the chunk's evaluations, and the multi-reveal proof that
/// they agree with the blob commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub proof: G1Affine,
    pub coeffs: Vec<Fr>,
}

impl Frame {
    pub fn new(proof: G1Affine, coeffs: Vec<Fr>) -> Self {
        Self { proof, coeffs }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// Commitments attached to a blob: the KZG commitment to its polynomial, and
/// the length commitment and low-degree proof bounding its degree by
/// `length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobCommitments {
    pub commitment: G1Affine,
    pub length_commitment: G2Affine,
    pub length_proof: G2Affine,
    /// Number of field elements in the blob.
    pub length: u32,
}

/// Verification surface a node depends on when accepting chunks.
pub trait BlobVerifier {
    /// Checks that the blob's polynomial has fewer than `commitments.length`
    /// coefficients.
    fn verify_blob_length(&self, commitments: &BlobCommitments) -> Result<(), KzgError>;

    /// Checks every frame against the blob commitment; `indices[i]` is the
    /// chunk number of `frames[i]`.
    fn verify_frames(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        commitments: &BlobCommitments,
        params: EncodingParams,
    ) -> Result<(), KzgError>;

    /// Reconstructs at most `max_input_size` bytes of the blob from frames.
    fn decode(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        params: EncodingParams,
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError>;
}
