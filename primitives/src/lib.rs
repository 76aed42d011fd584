//! Building blocks for verifying EigenDA chunks on bn254.
//!
//! A blob of user data is interpreted as the coefficients of a polynomial
//! `p`, committed to with KZG and Reed-Solomon extended over a multiplicative
//! subgroup of `Fr`. The extended evaluations are split into chunks
//! ("frames"); chunk `i` holds the evaluations of `p` on the coset `w·⟨φ⟩`,
//! with `φ` a primitive `chunk_length`-th root of unity and `w = ω^j` for
//! `j` the bit-reversal of `i` within `num_chunks`. Each frame carries the
//! coefficients of the interpolation polynomial on that coset together with
//! a single G1 multi-reveal proof.
//!
//! This crate holds what the verifier needs around that scheme:
//!
//! - [encoding]: encoding parameters, frames, blob commitments and the
//!   [encoding::BlobVerifier] seam.
//! - [rs]: the Reed-Solomon coder over an `ark-poly` radix-2 domain, which
//!   maps chunk indices to cosets and decodes blobs.
//! - [srs] and [config]: the structured reference string, loaded from the
//!   gnark-format point files described by [config::KzgConfig].
//! - [helpers] and [traits]: point codecs, pairing checks and byte/field
//!   conversions.

pub mod config;
pub mod consts;
pub mod encoding;
pub mod errors;
pub mod helpers;
pub mod rs;
pub mod srs;
#[cfg(any(test, feature = "testutils"))]
pub mod testutils;
pub mod traits;
