use ark_bn254::{g1::G1Affine, g2::G2Affine};
use ark_ec::AffineRepr;

use crate::consts::{SIZE_OF_G1_AFFINE_COMPRESSED, SIZE_OF_G2_AFFINE_COMPRESSED};
use crate::errors::KzgError;

#[derive(Debug, thiserror::Error)]
pub enum PointReadError {
    #[error("Invalid point data: {0}")]
    InvalidData(String),
}

impl From<PointReadError> for KzgError {
    fn from(err: PointReadError) -> Self {
        KzgError::SerializationError(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, PointReadError>;

/// Points stored in the gnark compressed big-endian format used by the SRS
/// files.
pub trait ReadPointFromBytes: AffineRepr {
    /// Size in bytes of one compressed point.
    const COMPRESSED_SIZE: usize;

    fn read_point_from_bytes_be(bytes: &[u8]) -> Result<Self>;
}

impl ReadPointFromBytes for G1Affine {
    const COMPRESSED_SIZE: usize = SIZE_OF_G1_AFFINE_COMPRESSED;

    fn read_point_from_bytes_be(bytes: &[u8]) -> Result<G1Affine> {
        crate::helpers::read_g1_point_from_bytes_be(bytes)
            .map_err(|e| PointReadError::InvalidData(e.to_string()))
    }
}

impl ReadPointFromBytes for G2Affine {
    const COMPRESSED_SIZE: usize = SIZE_OF_G2_AFFINE_COMPRESSED;

    fn read_point_from_bytes_be(bytes: &[u8]) -> Result<G2Affine> {
        crate::helpers::read_g2_point_from_bytes_be(bytes)
            .map_err(|e| PointReadError::InvalidData(e.to_string()))
    }
}
