//! A trusted setup with a known secret, producing honest commitments and
//! proofs. For tests and benches only: anyone holding `tau` can forge
//! proofs.

use ark_bn254::{Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Field;
use ark_std::{rand::Rng, UniformRand, Zero};
use std::path::Path;

use crate::{
    config::KzgConfig,
    encoding::{BlobCommitments, EncodingParams, Frame},
    errors::KzgError,
    helpers::{compute_powers, g1_lincomb, g1_point_to_bytes_be, g2_point_to_bytes_be},
    rs::{ErasureCoder, RsEncoder},
    srs::Srs,
};

pub struct TestSetup {
    tau: Fr,
    srs: Srs,
}

impl TestSetup {
    pub fn new<R: Rng>(order: u64, rng: &mut R) -> Result<Self, KzgError> {
        Self::from_secret(Fr::rand(rng), order)
    }

    pub fn from_secret(tau: Fr, order: u64) -> Result<Self, KzgError> {
        let powers = compute_powers(&tau, order as usize);
        let g1: Vec<G1Projective> = powers.iter().map(|p| G1Affine::generator() * p).collect();
        let g2: Vec<G2Projective> = powers.iter().map(|p| G2Affine::generator() * p).collect();
        let srs = Srs::new(
            G1Projective::normalize_batch(&g1),
            G2Projective::normalize_batch(&g2),
            order,
        )?;
        Ok(Self { tau, srs })
    }

    pub fn tau(&self) -> Fr {
        self.tau
    }

    pub fn srs(&self) -> &Srs {
        &self.srs
    }

    pub fn into_srs(self) -> Srs {
        self.srs
    }

    fn evaluate(&self, coeffs: &[Fr]) -> Fr {
        coeffs
            .iter()
            .rev()
            .fold(Fr::zero(), |acc, c| acc * self.tau + c)
    }

    fn order(&self) -> u64 {
        self.srs.g1().len() as u64
    }

    pub fn commit(&self, coeffs: &[Fr]) -> Result<G1Affine, KzgError> {
        let points = self.srs.g1().get(..coeffs.len()).ok_or_else(|| {
            KzgError::IndexError(format!(
                "polynomial with {} coefficients exceeds the SRS",
                coeffs.len()
            ))
        })?;
        g1_lincomb::<G1Projective>(points, coeffs)
    }

    /// `[p(τ)]_2`
    pub fn length_commitment(&self, coeffs: &[Fr]) -> G2Affine {
        (G2Affine::generator() * self.evaluate(coeffs)).into_affine()
    }

    /// `[τ^(order - length) · p(τ)]_2`
    pub fn length_proof(&self, coeffs: &[Fr], length: u32) -> Result<G2Affine, KzgError> {
        let shift = self.order().checked_sub(length as u64).ok_or_else(|| {
            KzgError::IndexError(format!(
                "length {} exceeds SRS order {}",
                length,
                self.order()
            ))
        })?;
        let scalar = self.tau.pow([shift]) * self.evaluate(coeffs);
        Ok((G2Affine::generator() * scalar).into_affine())
    }

    pub fn blob_commitments(
        &self,
        coeffs: &[Fr],
        length: u32,
    ) -> Result<BlobCommitments, KzgError> {
        Ok(BlobCommitments {
            commitment: self.commit(coeffs)?,
            length_commitment: self.length_commitment(coeffs),
            length_proof: self.length_proof(coeffs, length)?,
            length,
        })
    }

    /// Encodes the polynomial and attaches to every chunk the proof
    /// `[(p(τ) - r(τ)) / (τ^n - w^n)]_1`.
    pub fn frames(&self, coeffs: &[Fr], params: EncodingParams) -> Result<Vec<Frame>, KzgError> {
        let encoder = RsEncoder::new(params)?;
        let chunks = encoder.encode(coeffs)?;
        let n = [params.chunk_length];
        let p_tau = self.evaluate(coeffs);
        let tau_n = self.tau.pow(n);

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| -> Result<Frame, KzgError> {
                let w = encoder.coset_shift(i as u64)?;
                let denominator = (tau_n - w.pow(n)).inverse().ok_or_else(|| {
                    KzgError::GenericError("secret lies on a chunk coset".to_string())
                })?;
                let quotient = (p_tau - self.evaluate(&chunk)) * denominator;
                let proof = (G1Affine::generator() * quotient).into_affine();
                Ok(Frame::new(proof, chunk))
            })
            .collect()
    }

    /// Writes `g1.point`, `g2.point` and `g2.point.powerOf2` into `dir` and
    /// returns a config loading `number_to_load` points from them.
    pub fn write_srs_files(&self, dir: &Path, number_to_load: u64) -> Result<KzgConfig, KzgError> {
        std::fs::create_dir_all(dir)?;
        let g1_path = dir.join("g1.point");
        let g2_path = dir.join("g2.point");
        let g2_power_of_2_path = dir.join("g2.point.powerOf2");

        let g1_bytes: Vec<u8> = self.srs.g1().iter().flat_map(g1_point_to_bytes_be).collect();
        let g2_bytes: Vec<u8> = self.srs.g2().iter().flat_map(g2_point_to_bytes_be).collect();
        let g2_power_of_2_bytes: Vec<u8> = (0..64)
            .map(|i| 1u64 << i)
            .take_while(|index| *index < self.order())
            .flat_map(|index| g2_point_to_bytes_be(&self.srs.g2()[index as usize]))
            .collect();

        std::fs::write(&g1_path, g1_bytes)?;
        std::fs::write(&g2_path, g2_bytes)?;
        std::fs::write(&g2_power_of_2_path, g2_power_of_2_bytes)?;

        Ok(KzgConfig {
            g1_path: g1_path.to_string_lossy().into_owned(),
            g2_path: g2_path.to_string_lossy().into_owned(),
            g2_power_of_2_path: g2_power_of_2_path.to_string_lossy().into_owned(),
            srs_order: self.order(),
            srs_number_to_load: number_to_load,
            ..Default::default()
        })
    }
}
