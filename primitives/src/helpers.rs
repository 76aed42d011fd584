use ark_bn254::{g2, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::short_weierstrass::SWCurveConfig;
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{BigInteger, Field, PrimeField};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use ark_std::{One, Zero};
use core::cmp;

use crate::{
    consts::{
        BYTES_PER_FIELD_ELEMENT, MAX_LOG2_EVALUATIONS, PRIMITIVE_ROOTS_OF_UNITY,
        SIZE_OF_G1_AFFINE_COMPRESSED, SIZE_OF_G2_AFFINE_COMPRESSED,
    },
    errors::KzgError,
};

const MASK: u8 = 0b11 << 6;
const COMPRESSED_INFINITY: u8 = 0b01 << 6;
const COMPRESSED_SMALLEST: u8 = 0b10 << 6;
const COMPRESSED_LARGEST: u8 = 0b11 << 6;

pub fn set_bytes_canonical(data: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(data)
}

/// Interprets `data` as a sequence of 32-byte big-endian field elements. The
/// last element is right-padded with zeroes when `data` is not a multiple of
/// 32 bytes. Values above the modulus are reduced.
pub fn to_fr_array(data: &[u8]) -> Vec<Fr> {
    data.chunks(BYTES_PER_FIELD_ELEMENT)
        .map(|chunk| {
            if chunk.len() == BYTES_PER_FIELD_ELEMENT {
                set_bytes_canonical(chunk)
            } else {
                let mut padded = [0u8; BYTES_PER_FIELD_ELEMENT];
                padded[..chunk.len()].copy_from_slice(chunk);
                set_bytes_canonical(&padded)
            }
        })
        .collect()
}

/// Converts a slice of field elements to a byte array with size constraints
///
/// # Arguments
/// * `data_fr` - Slice of field elements to convert to bytes
/// * `max_output_size` - Maximum allowed size in bytes for the output buffer
///
/// # Returns
/// * `Vec<u8>` - Byte array containing the encoded field elements, truncated if needed
///
/// # Details
/// - Each field element is converted to BYTES_PER_FIELD_ELEMENT big-endian bytes
/// - Output is truncated to max_output_size if total bytes would exceed it
///
/// # Example
/// ```
/// use ark_bn254::Fr;
/// use kzgrs_primitives::helpers;
///
/// let bytes = helpers::to_byte_array(&[Fr::from(1u64), Fr::from(2u64)], 40);
/// assert_eq!(bytes.len(), 40);
/// assert_eq!(bytes[31], 1);
/// ```
pub fn to_byte_array(data_fr: &[Fr], max_output_size: usize) -> Vec<u8> {
    let data_size = cmp::min(data_fr.len() * BYTES_PER_FIELD_ELEMENT, max_output_size);
    let mut data = vec![0u8; data_size];

    for (i, element) in data_fr.iter().enumerate() {
        let start = i * BYTES_PER_FIELD_ELEMENT;
        if start >= data_size {
            break;
        }
        let v: Vec<u8> = element.into_bigint().to_bytes_be();
        let end = cmp::min(start + BYTES_PER_FIELD_ELEMENT, data_size);
        data[start..end].copy_from_slice(&v[..end - start]);
    }

    data
}

pub fn is_zeroed(first_byte: u8, buf: &[u8]) -> bool {
    first_byte == 0 && buf.iter().all(|byte| *byte == 0)
}

/// Whether `z` is larger than its negation, i.e. larger than `(p - 1) / 2`
/// once taken out of Montgomery form.
pub fn lexicographically_largest(z: &Fq) -> bool {
    z.into_bigint() > Fq::MODULUS_MINUS_ONE_DIV_TWO
}

/// gnark ordering on `Fq2`: compare the imaginary part unless it is zero.
pub fn lexicographically_largest_fq2(z: &Fq2) -> bool {
    if z.c1.is_zero() {
        lexicographically_largest(&z.c0)
    } else {
        lexicographically_largest(&z.c1)
    }
}

fn read_fq_be(bytes: &[u8]) -> Result<Fq, KzgError> {
    let x = Fq::from_be_bytes_mod_order(bytes);
    if x.into_bigint().to_bytes_be() != bytes {
        return Err(KzgError::SerializationError(
            "coordinate is not a canonical field element".to_string(),
        ));
    }
    Ok(x)
}

/// Reads a G1 point from its 32-byte gnark compressed big-endian encoding.
///
/// The two most significant bits of the first byte flag the point at
/// infinity (`01`), or which square root of `x³ + 3` is `y`: the
/// lexicographically smallest (`10`) or largest (`11`).
pub fn read_g1_point_from_bytes_be(g1_bytes_be: &[u8]) -> Result<G1Affine, KzgError> {
    if g1_bytes_be.len() != SIZE_OF_G1_AFFINE_COMPRESSED {
        return Err(KzgError::SerializationError(
            "not enough bytes for g1 point".to_string(),
        ));
    }

    let m_data = g1_bytes_be[0] & MASK;
    if m_data == COMPRESSED_INFINITY {
        if !is_zeroed(g1_bytes_be[0] & !MASK, &g1_bytes_be[1..]) {
            return Err(KzgError::SerializationError(
                "point at infinity not coded properly for g1".to_string(),
            ));
        }
        return Ok(G1Affine::identity());
    }
    if m_data != COMPRESSED_SMALLEST && m_data != COMPRESSED_LARGEST {
        return Err(KzgError::SerializationError(
            "g1 point is not in compressed form".to_string(),
        ));
    }

    let mut x_bytes = [0u8; SIZE_OF_G1_AFFINE_COMPRESSED];
    x_bytes.copy_from_slice(g1_bytes_be);
    x_bytes[0] &= !MASK;
    let x = read_fq_be(&x_bytes)?;

    let y_squared = x * x * x + ark_bn254::g1::Config::COEFF_B;
    let mut y = y_squared
        .sqrt()
        .ok_or_else(|| KzgError::NotOnCurveError("g1 point not on curve".to_string()))?;
    if lexicographically_largest(&y) != (m_data == COMPRESSED_LARGEST) {
        y = -y;
    }

    let point = G1Affine::new_unchecked(x, y);
    validate_g1_point(&point)?;
    Ok(point)
}

/// Reads a G2 point from its 64-byte gnark compressed big-endian encoding:
/// `x.c1 || x.c0`, flags in the top bits of the first byte as for G1.
pub fn read_g2_point_from_bytes_be(g2_bytes_be: &[u8]) -> Result<G2Affine, KzgError> {
    if g2_bytes_be.len() != SIZE_OF_G2_AFFINE_COMPRESSED {
        return Err(KzgError::SerializationError(
            "not enough bytes for g2 point".to_string(),
        ));
    }

    let m_data = g2_bytes_be[0] & MASK;
    if m_data == COMPRESSED_INFINITY {
        if !is_zeroed(g2_bytes_be[0] & !MASK, &g2_bytes_be[1..]) {
            return Err(KzgError::SerializationError(
                "point at infinity not coded properly for g2".to_string(),
            ));
        }
        return Ok(G2Affine::identity());
    }
    if m_data != COMPRESSED_SMALLEST && m_data != COMPRESSED_LARGEST {
        return Err(KzgError::SerializationError(
            "g2 point is not in compressed form".to_string(),
        ));
    }

    let half = SIZE_OF_G2_AFFINE_COMPRESSED / 2;
    let mut c1_bytes = [0u8; SIZE_OF_G1_AFFINE_COMPRESSED];
    c1_bytes.copy_from_slice(&g2_bytes_be[..half]);
    c1_bytes[0] &= !MASK;
    let x = Fq2::new(read_fq_be(&g2_bytes_be[half..])?, read_fq_be(&c1_bytes)?);

    let y_squared = x * x * x + g2::Config::COEFF_B;
    let mut y = y_squared
        .sqrt()
        .ok_or_else(|| KzgError::NotOnCurveError("g2 point not on curve".to_string()))?;
    if lexicographically_largest_fq2(&y) != (m_data == COMPRESSED_LARGEST) {
        y = -y;
    }

    let point = G2Affine::new_unchecked(x, y);
    validate_g2_point(&point)?;
    Ok(point)
}

/// Encodes a G1 point in the gnark compressed big-endian format.
pub fn g1_point_to_bytes_be(point: &G1Affine) -> [u8; SIZE_OF_G1_AFFINE_COMPRESSED] {
    let mut out = [0u8; SIZE_OF_G1_AFFINE_COMPRESSED];
    if point.is_zero() {
        out[0] = COMPRESSED_INFINITY;
        return out;
    }
    out.copy_from_slice(&point.x.into_bigint().to_bytes_be());
    out[0] |= if lexicographically_largest(&point.y) {
        COMPRESSED_LARGEST
    } else {
        COMPRESSED_SMALLEST
    };
    out
}

/// Encodes a G2 point in the gnark compressed big-endian format.
pub fn g2_point_to_bytes_be(point: &G2Affine) -> [u8; SIZE_OF_G2_AFFINE_COMPRESSED] {
    let mut out = [0u8; SIZE_OF_G2_AFFINE_COMPRESSED];
    if point.is_zero() {
        out[0] = COMPRESSED_INFINITY;
        return out;
    }
    let half = SIZE_OF_G2_AFFINE_COMPRESSED / 2;
    out[..half].copy_from_slice(&point.x.c1.into_bigint().to_bytes_be());
    out[half..].copy_from_slice(&point.x.c0.into_bigint().to_bytes_be());
    out[0] |= if lexicographically_largest_fq2(&point.y) {
        COMPRESSED_LARGEST
    } else {
        COMPRESSED_SMALLEST
    };
    out
}

/// Checks that a G1 point is on the curve and in the prime-order subgroup.
/// The point at infinity is accepted.
pub fn validate_g1_point(point: &G1Affine) -> Result<(), KzgError> {
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(KzgError::NotOnCurveError(
            "g1 point not on curve or not in subgroup".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a G2 point is on the curve and in the prime-order subgroup.
/// The point at infinity is accepted.
pub fn validate_g2_point(point: &G2Affine) -> Result<(), KzgError> {
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(KzgError::NotOnCurveError(
            "g2 point not on curve or not in subgroup".to_string(),
        ));
    }
    Ok(())
}

/// Computes powers of a field element up to a given exponent.
///
/// For a given field element x, computes [1, x, x², x³, ..., x^(count-1)]
pub fn compute_powers(base: &Fr, count: usize) -> Vec<Fr> {
    let mut powers = Vec::with_capacity(count);
    let mut current = Fr::one();
    for _ in 0..count {
        powers.push(current);
        current *= base;
    }
    powers
}

/// Computes a linear combination of points weighted by scalar coefficients.
///
/// Given points P₁, P₂, ..., Pₙ and scalars s₁, s₂, ..., sₙ
/// Computes: s₁P₁ + s₂P₂ + ... + sₙPₙ
/// Uses Multi-Scalar Multiplication (MSM) for efficient computation.
pub fn g1_lincomb<G: CurveGroup>(
    points: &[G::Affine],
    scalars: &[G::ScalarField],
) -> Result<G::Affine, KzgError> {
    let lincomb = G::msm(points, scalars).map_err(|len| {
        KzgError::MsmError(format!(
            "{} points and {} scalars, mismatch at {}",
            points.len(),
            scalars.len(),
            len
        ))
    })?;
    Ok(lincomb.into_affine())
}

/// Checks `e(a1, a2) == e(b1, b2)` with a single multi-pairing:
/// `e(a1, a2) · e(-b1, b2) == 1`.
pub fn pairings_verify<E: Pairing>(
    a1: E::G1Affine,
    a2: E::G2Affine,
    b1: E::G1Affine,
    b2: E::G2Affine,
) -> bool {
    let neg_b1 = (-b1.into_group()).into_affine();
    let p = [a1, neg_b1];
    let q = [a2, b2];
    E::multi_pairing(p, q).is_zero()
}

/// Radix-2 evaluation domain of `size` points. Its generator must be the
/// gnark root of unity of that order, since chunk cosets are defined by it.
pub fn evaluation_domain(size: u64) -> Result<Radix2EvaluationDomain<Fr>, KzgError> {
    if !size.is_power_of_two() {
        return Err(KzgError::FFTError(format!(
            "domain size {} is not a power of two",
            size
        )));
    }
    let expected_gen = PRIMITIVE_ROOTS_OF_UNITY
        .get(size.trailing_zeros() as usize)
        .ok_or_else(|| {
            KzgError::FFTError(format!(
                "domain size {} exceeds 2^{}",
                size, MAX_LOG2_EVALUATIONS
            ))
        })?;
    let domain = usize::try_from(size)
        .ok()
        .and_then(Radix2EvaluationDomain::<Fr>::new)
        .ok_or_else(|| KzgError::FFTError(format!("no evaluation domain of size {}", size)))?;
    if domain.group_gen() != *expected_gen {
        return Err(KzgError::FFTError(format!(
            "generator of the domain of size {} is not the expected root of unity",
            size
        )));
    }
    Ok(domain)
}

/// Reverses the lowest `log2(length)` bits of `value`, with `length` a power
/// of two. Lengths of 0 and 1 map every value to 0.
pub fn reverse_bits_limited(length: u32, value: u32) -> u32 {
    if length <= 1 {
        return 0;
    }
    let unused_bit_len = (length - 1).leading_zeros();
    value.reverse_bits() >> unused_bit_len
}

/// Permutes `values` in place into bit-reversed index order.
pub fn reverse_bit_order<T>(values: &mut [T]) -> Result<(), KzgError> {
    let length = values.len();
    if !length.is_power_of_two() {
        return Err(KzgError::FFTError(format!(
            "bit reversal requires a power of two length, got {}",
            length
        )));
    }
    let length = u32::try_from(length)
        .map_err(|_| KzgError::FFTError("bit reversal length exceeds u32".to_string()))?;

    for i in 0..length {
        let r = reverse_bits_limited(length, i);
        if i < r {
            values.swap(i as usize, r as usize);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_bits_limited() {
        assert_eq!(reverse_bits_limited(1, 0), 0);
        assert_eq!(reverse_bits_limited(4, 1), 2);
        assert_eq!(reverse_bits_limited(4, 3), 3);
        assert_eq!(reverse_bits_limited(8, 1), 4);
        assert_eq!(reverse_bits_limited(8, 6), 3);
    }

    #[test]
    fn test_reverse_bit_order() {
        let mut values: Vec<u32> = (0..8).collect();
        reverse_bit_order(&mut values).unwrap();
        assert_eq!(values, vec![0, 4, 2, 6, 1, 5, 3, 7]);

        let mut odd = vec![1, 2, 3];
        assert!(reverse_bit_order(&mut odd).is_err());
    }

    #[test]
    fn test_lexicographically_largest() {
        assert!(!lexicographically_largest(&Fq::zero()));
        assert!(!lexicographically_largest(&Fq::one()));
        assert!(lexicographically_largest(&-Fq::one()));
    }
}
