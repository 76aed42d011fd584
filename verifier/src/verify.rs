use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::Field;
use kzgrs_primitives::{errors::KzgError, helpers};

/// Verifies that a committed polynomial has fewer than `length` coefficients.
///
/// The prover commits to `p` in G2 as `[p(τ)]_2` and proves the degree bound
/// with `[τ^(order - length) · p(τ)]_2`. Since the SRS stops at
/// `τ^(order - 1)`, that proof can only be built when `deg(p) < length`.
///
/// # Arguments
///
/// * `g1_challenge` - The SRS point `[τ^(order - length)]_1`
/// * `length_commitment` - The G2 commitment `[p(τ)]_2`
/// * `length_proof` - The G2 proof `[τ^(order - length) · p(τ)]_2`
///
/// # Returns
///
/// * `true` iff `e([τ^(order - length)]_1, [p(τ)]_2) == e(G1, proof)`
///
/// # Examples
///
/// ```rust,no_run
/// use ark_bn254::{Bn254, G1Affine, G2Affine};
/// use ark_ec::AffineRepr;
/// use kzgrs_verifier::verify::verify_low_degree_proof;
///
/// // with length == order the challenge is the generator itself
/// let commitment = G2Affine::generator();
/// assert!(verify_low_degree_proof::<Bn254>(&G1Affine::generator(), &commitment, &commitment));
/// ```
pub fn verify_low_degree_proof<E: Pairing>(
    g1_challenge: &E::G1Affine,
    length_commitment: &E::G2Affine,
    length_proof: &E::G2Affine,
) -> bool {
    helpers::pairings_verify::<E>(
        *g1_challenge,
        *length_commitment,
        E::G1Affine::generator(),
        *length_proof,
    )
}

/// Verifies a multi-reveal proof: that `coeffs` are the coefficients of the
/// polynomial `I` interpolating the committed polynomial `p` on the coset
/// `{x·φ^k}` of size `n = coeffs.len()`.
///
/// `p - I` vanishes on the coset, whose vanishing polynomial is `X^n - x^n`,
/// so the prover can commit to the quotient `q = (p - I) / (X^n - x^n)`.
///
/// # Arguments
///
/// * `coeffs` - Coefficients of the interpolation polynomial `I`
/// * `proof` - The quotient commitment `[q(τ)]_1`
/// * `commitment` - The blob commitment `[p(τ)]_1`
/// * `x` - The coset shift, a root of unity
/// * `g2_at_n` - The SRS point `[τ^n]_2`
/// * `srs_g1` - At least the first `n` SRS points `[τ^i]_1`
///
/// # Returns
///
/// * `Ok(true)` - If `e([p(τ)]_1 - [I(τ)]_1, G2) == e(proof, [τ^n - x^n]_2)`
/// * `Ok(false)` - If the pairing check fails
/// * `Err(KzgError)` - If the SRS holds fewer than `n` points or the MSM fails
///
/// # Examples
///
/// ```rust,no_run
/// use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
/// use ark_ec::AffineRepr;
/// use kzgrs_verifier::verify::verify_frame_proof;
///
/// let srs_g1 = vec![G1Affine::generator(); 2];
/// let coeffs = vec![Fr::from(1u64), Fr::from(2u64)];
/// let ok = verify_frame_proof::<Bn254>(
///     &coeffs,
///     &G1Affine::generator(),
///     &G1Affine::generator(),
///     &Fr::from(1u64),
///     &G2Affine::generator(),
///     &srs_g1,
/// );
/// assert!(ok.is_ok());
/// ```
pub fn verify_frame_proof<E: Pairing>(
    coeffs: &[E::ScalarField],
    proof: &E::G1Affine,
    commitment: &E::G1Affine,
    x: &E::ScalarField,
    g2_at_n: &E::G2Affine,
    srs_g1: &[E::G1Affine],
) -> Result<bool, KzgError> {
    let n = coeffs.len();
    let srs_prefix = srs_g1.get(..n).ok_or_else(|| {
        KzgError::IndexError(format!(
            "interpolation needs {} SRS G1 points, have {}",
            n,
            srs_g1.len()
        ))
    })?;

    // [x^n]_2
    let x_pow = x.pow([n as u64]);
    let xn_g2 = E::G2Affine::generator() * x_pow;

    // [τ^n - x^n]_2, the vanishing polynomial of the coset
    let xn_minus_yn = (g2_at_n.into_group() - xn_g2).into_affine();

    // [I(τ)]_1
    let interpolation = helpers::g1_lincomb::<E::G1>(srs_prefix, coeffs)?;

    // [p(τ) - I(τ)]_1
    let commit_minus_interpolation = (commitment.into_group() - interpolation).into_affine();

    // e([p(τ) - I(τ)]_1, G2) == e([q(τ)]_1, [τ^n - x^n]_2)
    Ok(helpers::pairings_verify::<E>(
        commit_minus_interpolation,
        E::G2Affine::generator(),
        *proof,
        xn_minus_yn,
    ))
}
