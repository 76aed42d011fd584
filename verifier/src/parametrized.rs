use ark_bn254::{Bn254, G1Affine};
use kzgrs_primitives::{
    encoding::{ChunkNumber, EncodingParams, Frame},
    errors::KzgError,
    helpers::validate_g1_point,
    rs::{ErasureCoder, RsEncoder},
    srs::SrsProvider,
};
use std::sync::Arc;

use crate::verify::verify_frame_proof;

/// Verification context for one set of [`EncodingParams`].
///
/// Holds the SRS points needed for interpolation commitments and the erasure
/// coder for the parameters, whose evaluation domain supplies the coset
/// shifts. Immutable once built and shared between threads through an `Arc`.
#[derive(Debug)]
pub struct ParametrizedVerifier<C: ErasureCoder = RsEncoder> {
    params: EncodingParams,
    srs: Arc<dyn SrsProvider>,
    // [τ^i]_1 for i in 0..chunk_length
    srs_g1_prefix: Vec<G1Affine>,
    coder: C,
}

impl<C: ErasureCoder> ParametrizedVerifier<C> {
    pub fn new(params: EncodingParams, srs: Arc<dyn SrsProvider>) -> Result<Self, KzgError> {
        params.validate()?;
        let num_evaluations = params.num_evaluations();
        if srs.num_g1_loaded() < num_evaluations {
            return Err(KzgError::ConfigError(format!(
                "SRS has {} G1 points loaded, encoding needs {}",
                srs.num_g1_loaded(),
                num_evaluations
            )));
        }
        let srs_g1_prefix = srs.g1_points(0, params.chunk_length)?;

        let coder = C::new(params)?;

        Ok(Self {
            params,
            srs,
            srs_g1_prefix,
            coder,
        })
    }

    pub fn params(&self) -> &EncodingParams {
        &self.params
    }

    /// Verifies that `frame` is chunk `index` of the blob committed to by
    /// `commitment`.
    pub fn verify_frame(
        &self,
        commitment: &G1Affine,
        frame: &Frame,
        index: ChunkNumber,
    ) -> Result<(), KzgError> {
        let n = frame.coeffs.len();
        if n as u64 != self.params.chunk_length {
            return Err(KzgError::FrameLengthMismatch {
                expected: self.params.chunk_length as usize,
                actual: n,
            });
        }
        validate_g1_point(commitment)?;
        validate_g1_point(&frame.proof)?;

        let x = self.coder.coset_shift(index)?;

        let g2_at_n = self.srs.g2_point(n as u64)?;

        if !verify_frame_proof::<Bn254>(
            &frame.coeffs,
            &frame.proof,
            commitment,
            &x,
            &g2_at_n,
            &self.srs_g1_prefix,
        )? {
            return Err(KzgError::ProofInvalid(format!(
                "multireveal proof fails for chunk {}",
                index
            )));
        }
        Ok(())
    }

    /// Decodes at most `max_input_size` bytes of the blob from chunk
    /// coefficients. Proofs are not checked.
    pub fn decode(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError> {
        let coeffs: Vec<&[ark_bn254::Fr]> = frames.iter().map(|f| f.coeffs.as_slice()).collect();
        self.coder.decode(&coeffs, indices, max_input_size)
    }
}
