use ark_bn254::Fr;
use ark_ff::{batch_inversion, FftField};
use ark_poly::{
    univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain, Polynomial,
    Radix2EvaluationDomain,
};
use ark_std::{One, Zero};

use crate::{
    consts::BYTES_PER_FIELD_ELEMENT,
    encoding::{ChunkNumber, EncodingParams},
    errors::KzgError,
    helpers::{evaluation_domain, reverse_bit_order, reverse_bits_limited, to_byte_array},
};

/// Erasure code bound to one set of encoding parameters.
///
/// The verifier only needs two things from it: which coset of the
/// evaluation domain a chunk covers, and how to rebuild the blob from enough
/// chunks.
pub trait ErasureCoder: Sized + Send + Sync {
    fn new(params: EncodingParams) -> Result<Self, KzgError>;

    fn params(&self) -> &EncodingParams;

    /// Domain of all `num_evaluations` points, generated by `ω`.
    fn domain(&self) -> &Radix2EvaluationDomain<Fr>;

    /// Index `j` of the root of unity `ω^j` that shifts the chunk's coset.
    fn leading_coset_index(&self, chunk_index: ChunkNumber) -> Result<u32, KzgError> {
        get_leading_coset_index(chunk_index, self.params().num_chunks)
    }

    /// The shift `ω^j` of the coset holding chunk `chunk_index`.
    fn coset_shift(&self, chunk_index: ChunkNumber) -> Result<Fr, KzgError> {
        let j = self.leading_coset_index(chunk_index)?;
        Ok(self.domain().element(j as usize))
    }

    /// Rebuilds the first `max_input_size` bytes of the blob from the
    /// coefficients of the given chunks.
    fn decode(
        &self,
        frames: &[&[Fr]],
        indices: &[ChunkNumber],
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError>;
}

/// Chunk `i` covers the coset shifted by `ω^j` with `j` the bit-reversal of
/// `i` within `num_chunks`.
pub fn get_leading_coset_index(
    chunk_index: ChunkNumber,
    num_chunks: u64,
) -> Result<u32, KzgError> {
    if chunk_index >= num_chunks {
        return Err(KzgError::IndexError(format!(
            "chunk index {} is out of range for {} chunks",
            chunk_index, num_chunks
        )));
    }
    let num_chunks = u32::try_from(num_chunks).map_err(|_| {
        KzgError::IndexError(format!("{} chunks exceed the evaluation domain", num_chunks))
    })?;
    Ok(reverse_bits_limited(num_chunks, chunk_index as u32))
}

/// `∏ (X - p)` over `points`, multiplied pairwise up a product tree so each
/// level costs one round of FFT multiplications.
pub fn vanishing_poly(points: &[Fr]) -> DensePolynomial<Fr> {
    let mut layer: Vec<DensePolynomial<Fr>> = points
        .iter()
        .map(|p| DensePolynomial::from_coefficients_vec(vec![-*p, Fr::one()]))
        .collect();

    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut polys = layer.into_iter();
        while let Some(left) = polys.next() {
            next.push(match polys.next() {
                Some(right) => &left * &right,
                None => left,
            });
        }
        layer = next;
    }

    layer
        .pop()
        .unwrap_or_else(|| DensePolynomial::from_coefficients_vec(vec![Fr::one()]))
}

/// Reed-Solomon code over the radix-2 domain of `num_evaluations` points.
#[derive(Debug, Clone)]
pub struct RsEncoder {
    params: EncodingParams,
    domain: Radix2EvaluationDomain<Fr>,
    // subgroup of size chunk_length, generated by φ = ω^num_chunks
    chunk_domain: Radix2EvaluationDomain<Fr>,
}

impl RsEncoder {
    /// Extends the polynomial with coefficients `input_fr` to all
    /// `num_evaluations` points and returns, per chunk, the coefficients of
    /// the polynomial interpolating the chunk's evaluations on its coset.
    pub fn encode(&self, input_fr: &[Fr]) -> Result<Vec<Vec<Fr>>, KzgError> {
        let num_evaluations = self.domain.size();
        if input_fr.len() > num_evaluations {
            return Err(KzgError::InvalidInputLength);
        }

        let mut padded = input_fr.to_vec();
        padded.resize(num_evaluations, Fr::zero());
        let mut poly_evals = self.domain.fft(&padded);
        reverse_bit_order(&mut poly_evals)?;

        let chunk_length = self.params.chunk_length as usize;
        poly_evals
            .chunks_exact(chunk_length)
            .enumerate()
            .map(|(i, chunk)| {
                let coset = get_leading_coset_index(i as ChunkNumber, self.params.num_chunks)?;
                let mut ys = chunk.to_vec();
                reverse_bit_order(&mut ys)?;
                self.interpolation_poly_coeffs(&ys, coset as usize)
            })
            .collect()
    }

    /// Coefficients of `r` with `r(w·φ^s) = evals[s]`, where `w = ω^coset`.
    pub fn interpolation_poly_coeffs(
        &self,
        evals: &[Fr],
        coset: usize,
    ) -> Result<Vec<Fr>, KzgError> {
        self.check_chunk_len(evals.len())?;
        Ok(self.chunk_coset(coset)?.ifft(evals))
    }

    /// Evaluations `r(w·φ^s)` of the polynomial with coefficients `coeffs`.
    pub fn interpolation_poly_evals(
        &self,
        coeffs: &[Fr],
        coset: usize,
    ) -> Result<Vec<Fr>, KzgError> {
        self.check_chunk_len(coeffs.len())?;
        Ok(self.chunk_coset(coset)?.fft(coeffs))
    }

    fn check_chunk_len(&self, len: usize) -> Result<(), KzgError> {
        if len != self.chunk_domain.size() {
            return Err(KzgError::FFTError(format!(
                "got {} values for a coset of {}",
                len,
                self.chunk_domain.size()
            )));
        }
        Ok(())
    }

    fn chunk_coset(&self, coset: usize) -> Result<Radix2EvaluationDomain<Fr>, KzgError> {
        if coset >= self.params.num_chunks as usize {
            return Err(KzgError::IndexError(format!(
                "coset index {} is out of range",
                coset
            )));
        }
        self.chunk_domain
            .get_coset(self.domain.element(coset))
            .ok_or_else(|| KzgError::FFTError("coset shift is not invertible".to_string()))
    }

    /// Places every chunk's evaluations at their position in the full
    /// domain. Chunk with coset `j` holds the points `ω^(j + k·num_chunks)`.
    fn collect_samples(
        &self,
        frames: &[&[Fr]],
        indices: &[ChunkNumber],
    ) -> Result<(Vec<Option<Fr>>, usize), KzgError> {
        let num_chunks = self.params.num_chunks as usize;
        let chunk_length = self.params.chunk_length as usize;

        let mut samples = vec![None; self.domain.size()];
        let mut known = 0;
        for (coeffs, &index) in frames.iter().zip(indices) {
            if coeffs.len() != chunk_length {
                return Err(KzgError::DecodeError(format!(
                    "chunk {} has {} coefficients, expected {}",
                    index,
                    coeffs.len(),
                    chunk_length
                )));
            }
            let coset = get_leading_coset_index(index, self.params.num_chunks)
                .map_err(|e| KzgError::DecodeError(e.to_string()))?
                as usize;
            let evals = self.interpolation_poly_evals(coeffs, coset)?;

            for (k, eval) in evals.into_iter().enumerate() {
                let position = coset + k * num_chunks;
                let existing = samples[position];
                match existing {
                    Some(existing) if existing != eval => {
                        return Err(KzgError::DecodeError(format!(
                            "chunk {} contradicts a previous chunk with the same index",
                            index
                        )));
                    },
                    Some(_) => {},
                    None => {
                        samples[position] = Some(eval);
                        known += 1;
                    },
                }
            }
        }
        Ok((samples, known))
    }

    /// Vanishing polynomial of the cosets no chunk covered. Coset `j` vanishes
    /// on `X^L - ω^(j·L)`, so the product is `Q(X^L)` with `Q` the vanishing
    /// polynomial of the points `ω^(j·L)`.
    fn missing_cosets_zero_poly(&self, missing_cosets: &[usize]) -> DensePolynomial<Fr> {
        let chunk_length = self.params.chunk_length as usize;
        let points: Vec<Fr> = missing_cosets
            .iter()
            .map(|&j| self.domain.element(j * chunk_length))
            .collect();
        let reduced = vanishing_poly(&points);

        let mut coeffs = vec![Fr::zero(); reduced.degree() * chunk_length + 1];
        for (i, c) in reduced.coeffs.iter().enumerate() {
            coeffs[i * chunk_length] = *c;
        }
        DensePolynomial::from_coefficients_vec(coeffs)
    }

    /// Recovers the coefficients of the polynomial from the samples of the
    /// covered cosets. With `Z` vanishing on the missing points, `P·Z` is
    /// known on the whole domain; `P = (P·Z) / Z` is then evaluated on a
    /// shifted coset, where `Z` has no roots.
    fn recover_coefficients(&self, samples: &[Option<Fr>]) -> Result<Vec<Fr>, KzgError> {
        let num_chunks = self.params.num_chunks as usize;
        let missing_cosets: Vec<usize> =
            (0..num_chunks).filter(|&j| samples[j].is_none()).collect();

        if missing_cosets.is_empty() {
            let evals: Vec<Fr> = samples.iter().map(|s| s.unwrap_or_default()).collect();
            return Ok(self.domain.ifft(&evals));
        }

        let zero_poly = self.missing_cosets_zero_poly(&missing_cosets);
        let zero_evals = self.domain.fft(&zero_poly.coeffs);
        let poly_times_zero_evals: Vec<Fr> = samples
            .iter()
            .zip(zero_evals)
            .map(|(sample, z)| sample.map_or(Fr::zero(), |s| s * z))
            .collect();
        let poly_times_zero = self.domain.ifft(&poly_times_zero_evals);

        let shifted = self
            .domain
            .get_coset(Fr::GENERATOR)
            .ok_or_else(|| KzgError::FFTError("coset shift is not invertible".to_string()))?;
        let mut zero_shifted_inv = shifted.fft(&zero_poly.coeffs);
        batch_inversion(&mut zero_shifted_inv);
        let quotient_evals: Vec<Fr> = shifted
            .fft(&poly_times_zero)
            .into_iter()
            .zip(zero_shifted_inv)
            .map(|(pz, z_inv)| pz * z_inv)
            .collect();
        let mut coeffs = shifted.ifft(&quotient_evals);
        // the samples interpolate to degree below N - deg(Z), so the division is exact
        coeffs.truncate(self.domain.size() - zero_poly.degree());
        Ok(coeffs)
    }
}

impl ErasureCoder for RsEncoder {
    fn new(params: EncodingParams) -> Result<Self, KzgError> {
        params.validate()?;
        let domain = evaluation_domain(params.num_evaluations())
            .map_err(|e| KzgError::ConfigError(e.to_string()))?;
        let chunk_domain = evaluation_domain(params.chunk_length)
            .map_err(|e| KzgError::ConfigError(e.to_string()))?;
        Ok(Self {
            params,
            domain,
            chunk_domain,
        })
    }

    fn params(&self) -> &EncodingParams {
        &self.params
    }

    fn domain(&self) -> &Radix2EvaluationDomain<Fr> {
        &self.domain
    }

    fn decode(
        &self,
        frames: &[&[Fr]],
        indices: &[ChunkNumber],
        max_input_size: u64,
    ) -> Result<Vec<u8>, KzgError> {
        if frames.len() != indices.len() {
            return Err(KzgError::DecodeError(format!(
                "got {} frames but {} indices",
                frames.len(),
                indices.len()
            )));
        }
        let data_len = max_input_size.div_ceil(BYTES_PER_FIELD_ELEMENT as u64);
        if data_len > self.params.num_evaluations() {
            return Err(KzgError::DecodeError(format!(
                "max input size {} exceeds the capacity of the encoding",
                max_input_size
            )));
        }

        if data_len == 0 {
            return Ok(Vec::new());
        }

        let (samples, known) = self.collect_samples(frames, indices)?;
        if (known as u64) < data_len {
            return Err(KzgError::DecodeError(format!(
                "number of frames must be sufficient: have {} distinct evaluations, need {}",
                known, data_len
            )));
        }

        let coeffs = self.recover_coefficients(&samples)?;
        Ok(to_byte_array(&coeffs, max_input_size as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::{test_rng, UniformRand};

    fn evaluate(coeffs: &[Fr], x: &Fr) -> Fr {
        coeffs.iter().rev().fold(Fr::zero(), |acc, c| acc * x + c)
    }

    #[test]
    fn test_leading_coset_index() {
        assert_eq!(get_leading_coset_index(0, 4).unwrap(), 0);
        assert_eq!(get_leading_coset_index(1, 4).unwrap(), 2);
        assert_eq!(get_leading_coset_index(2, 4).unwrap(), 1);
        assert_eq!(get_leading_coset_index(3, 4).unwrap(), 3);
        assert_eq!(get_leading_coset_index(0, 1).unwrap(), 0);
        assert!(matches!(
            get_leading_coset_index(4, 4),
            Err(KzgError::IndexError(_))
        ));
    }

    #[test]
    fn test_chunks_interpolate_polynomial_on_their_coset() {
        let mut rng = test_rng();
        let params = EncodingParams::new(4, 8);
        let encoder = RsEncoder::new(params).unwrap();
        let poly: Vec<Fr> = (0..10).map(|_| Fr::rand(&mut rng)).collect();
        let chunks = encoder.encode(&poly).unwrap();
        assert_eq!(chunks.len(), 8);

        for (i, chunk) in chunks.iter().enumerate() {
            let coset = get_leading_coset_index(i as u64, 8).unwrap() as usize;
            assert_eq!(
                encoder.coset_shift(i as u64).unwrap(),
                encoder.domain().element(coset)
            );
            for k in 0..4 {
                let x = encoder.domain().element(coset + k * 8);
                assert_eq!(evaluate(chunk, &x), evaluate(&poly, &x));
            }
        }
    }

    #[test]
    fn test_interpolation_round_trip() {
        let mut rng = test_rng();
        let encoder = RsEncoder::new(EncodingParams::new(4, 4)).unwrap();
        let coeffs: Vec<Fr> = (0..4).map(|_| Fr::rand(&mut rng)).collect();
        let evals = encoder.interpolation_poly_evals(&coeffs, 3).unwrap();
        assert_eq!(encoder.interpolation_poly_coeffs(&evals, 3).unwrap(), coeffs);
        assert!(encoder.interpolation_poly_evals(&coeffs, 4).is_err());
        assert!(encoder.interpolation_poly_evals(&coeffs[..3], 0).is_err());
    }

    #[test]
    fn test_vanishing_poly() {
        let mut rng = test_rng();
        let points: Vec<Fr> = (0..13).map(|_| Fr::rand(&mut rng)).collect();
        let z = vanishing_poly(&points);
        assert_eq!(z.degree(), 13);
        assert_eq!(z.coeffs.last(), Some(&Fr::one()));
        for p in &points {
            assert!(z.evaluate(p).is_zero());
        }
        assert!(!z.evaluate(&Fr::rand(&mut rng)).is_zero());

        assert_eq!(vanishing_poly(&[]).coeffs, vec![Fr::one()]);
    }

    #[test]
    fn test_missing_cosets_zero_poly_vanishes_on_their_points() {
        let encoder = RsEncoder::new(EncodingParams::new(4, 8)).unwrap();
        let missing = [1usize, 4, 6];
        let z = encoder.missing_cosets_zero_poly(&missing);
        assert_eq!(z.degree(), 12);
        for j in 0..8 {
            for k in 0..4 {
                let x = encoder.domain().element(j + k * 8);
                assert_eq!(z.evaluate(&x).is_zero(), missing.contains(&j));
            }
        }
    }
}
