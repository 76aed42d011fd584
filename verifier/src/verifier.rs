use ark_bn254::{Bn254, G2Affine};
use kzgrs_primitives::{
    config::KzgConfig,
    encoding::{BlobCommitments, BlobVerifier, ChunkNumber, EncodingParams, Frame},
    errors::KzgError,
    helpers::validate_g2_point,
    rs::{ErasureCoder, RsEncoder},
    srs::{Srs, SrsProvider},
};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{parametrized::ParametrizedVerifier, verify::verify_low_degree_proof};

/// Entry point for chunk and blob length verification.
///
/// Owns the SRS and a cache of [`ParametrizedVerifier`]s keyed by
/// [`EncodingParams`]. Each distinct set of parameters is built at most once;
/// later lookups only take the read lock.
#[derive(Debug)]
pub struct Verifier<C: ErasureCoder = RsEncoder> {
    srs: Arc<dyn SrsProvider>,
    cache: RwLock<HashMap<EncodingParams, Arc<ParametrizedVerifier<C>>>>,
    cache_capacity: Option<usize>,
}

impl Verifier<RsEncoder> {
    pub fn new(srs: Arc<dyn SrsProvider>) -> Self {
        Self::with_coder(srs)
    }

    /// Loads the SRS described by `config` and builds a verifier on it.
    pub fn from_config(config: &KzgConfig) -> Result<Self, KzgError> {
        let srs = Srs::from_config(config)?;
        let verifier = Self::new(Arc::new(srs));
        Ok(match config.verifier_cache_capacity {
            Some(capacity) => verifier.with_cache_capacity(capacity),
            None => verifier,
        })
    }
}

impl<C: ErasureCoder> Verifier<C> {
    /// A verifier using the erasure coder `C`.
    pub fn with_coder(srs: Arc<dyn SrsProvider>) -> Self {
        info!(
            srs_order = srs.order(),
            g1_loaded = srs.num_g1_loaded(),
            "created KZG verifier"
        );
        Self {
            srs,
            cache: RwLock::new(HashMap::new()),
            cache_capacity: None,
        }
    }

    /// Caps the number of cached parameter sets. Once full, new parameters
    /// get a verifier that is not cached; cached entries are never evicted.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn srs(&self) -> &Arc<dyn SrsProvider> {
        &self.srs
    }

    pub fn cached_params_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns the cached verifier for `params`, building and caching it on
    /// first use.
    pub fn get_kzg_verifier(
        &self,
        params: EncodingParams,
    ) -> Result<Arc<ParametrizedVerifier<C>>, KzgError> {
        params.validate()?;

        let cached = self.cache.read().get(&params).cloned();
        if let Some(verifier) = cached {
            return Ok(verifier);
        }

        let mut cache = self.cache.write();
        // another caller may have built it while we waited for the write lock
        if let Some(verifier) = cache.get(&params) {
            return Ok(Arc::clone(verifier));
        }

        if let Some(capacity) = self.cache_capacity {
            if cache.len() >= capacity {
                drop(cache);
                warn!(
                    capacity,
                    chunk_length = params.chunk_length,
                    num_chunks = params.num_chunks,
                    "verifier cache is full, building an uncached verifier"
                );
                return self.new_kzg_verifier(params).map(Arc::new);
            }
        }

        debug!(
            chunk_length = params.chunk_length,
            num_chunks = params.num_chunks,
            "building parametrized verifier"
        );
        let verifier = Arc::new(ParametrizedVerifier::new(params, Arc::clone(&self.srs))?);
        cache.insert(params, Arc::clone(&verifier));
        Ok(verifier)
    }

    /// Builds a verifier for `params` without consulting or filling the
    /// cache.
    pub fn new_kzg_verifier(
        &self,
        params: EncodingParams,
    ) -> Result<ParametrizedVerifier<C>, KzgError> {
        params.validate()?;
        ParametrizedVerifier::new(params, Arc::clone(&self.srs))
    }

    /// Verifies the low-degree proof that the polynomial committed to in
    /// `length_commitment` has fewer than `length` coefficients.
    pub fn verify_commit(
        &self,
        length_commitment: &G2Affine,
        length_proof: &G2Affine,
        length: u32,
    ) -> Result<(), KzgError> {
        validate_g2_point(length_commitment)?;
        validate_g2_point(length_proof)?;

        let order = self.srs.order();
        let challenge_index = order.checked_sub(length as u64).ok_or_else(|| {
            KzgError::IndexError(format!(
                "blob length {} exceeds SRS order {}",
                length, order
            ))
        })?;
        let g1_challenge = self.srs.g1_point(challenge_index)?;

        if !verify_low_degree_proof::<Bn254>(&g1_challenge, length_commitment, length_proof) {
            return Err(KzgError::ProofInvalid("low degree proof fails".to_string()));
        }
        Ok(())
    }

    pub fn verify_blob_length(&self, commitments: &BlobCommitments) -> Result<(), KzgError> {
        self.verify_commit(
            &commitments.length_commitment,
            &commitments.length_proof,
            commitments.length,
        )
    }

    /// Verifies each `frames[i]` as chunk `indices[i]` of the committed blob,
    /// stopping at the first failure.
    pub fn verify_frames(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        commitments: &BlobCommitments,
        params: EncodingParams,
    ) -> Result<(), KzgError> {
        check_batch_lengths(frames, indices)?;
        let verifier = self.get_kzg_verifier(params)?;

        for (position, (frame, &index)) in frames.iter().zip(indices).enumerate() {
            verifier
                .verify_frame(&commitments.commitment, frame, index)
                .map_err(|source| chunk_failure(position, index, source))?;
        }
        Ok(())
    }

    /// Same checks as [`Verifier::verify_frames`], spread over the rayon
    /// pool. Reports the failing chunk with the lowest position, so the
    /// outcome does not depend on scheduling.
    pub fn verify_frames_parallel(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        commitments: &BlobCommitments,
        params: EncodingParams,
    ) -> Result<(), KzgError> {
        check_batch_lengths(frames, indices)?;
        let verifier = self.get_kzg_verifier(params)?;

        let failure = frames
            .par_iter()
            .zip(indices.par_iter())
            .enumerate()
            .map(|(position, (frame, &index))| {
                verifier
                    .verify_frame(&commitments.commitment, frame, index)
                    .map_err(|source| (position, index, source))
            })
            .find_first(|result| result.is_err());

        match failure {
            Some(Err((position, index, source))) => Err(chunk_failure(position, index, source)),
            _ => Ok(()),
        }
    }

    /// Reconstructs at most `max_input_size` bytes of the blob from the
    /// chunks' coefficients. Frames should have been verified first.
    pub fn decode(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        params: EncodingParams,
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError> {
        self.get_kzg_verifier(params)?
            .decode(frames, indices, max_input_size)
    }
}

impl<C: ErasureCoder> BlobVerifier for Verifier<C> {
    fn verify_blob_length(&self, commitments: &BlobCommitments) -> Result<(), KzgError> {
        Verifier::verify_blob_length(self, commitments)
    }

    fn verify_frames(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        commitments: &BlobCommitments,
        params: EncodingParams,
    ) -> Result<(), KzgError> {
        Verifier::verify_frames(self, frames, indices, commitments, params)
    }

    fn decode(
        &self,
        frames: &[Frame],
        indices: &[ChunkNumber],
        params: EncodingParams,
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError> {
        Verifier::decode(self, frames, indices, params, max_input_size)
    }
}

fn check_batch_lengths(frames: &[Frame], indices: &[ChunkNumber]) -> Result<(), KzgError> {
    if frames.len() != indices.len() {
        return Err(KzgError::GenericError(format!(
            "got {} frames but {} indices",
            frames.len(),
            indices.len()
        )));
    }
    Ok(())
}

fn chunk_failure(position: usize, chunk: ChunkNumber, source: KzgError) -> KzgError {
    debug!(position, chunk, error = %source, "chunk rejected");
    KzgError::ChunkVerification {
        position,
        chunk,
        source: Box::new(source),
    }
}
