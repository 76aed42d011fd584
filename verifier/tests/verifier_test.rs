#[cfg(test)]
mod tests {
    use ark_bn254::{Fr, G1Affine, G2Affine};
    use ark_ec::{AffineRepr, CurveGroup};
    use ark_ff::UniformRand;
    use ark_poly::Radix2EvaluationDomain;
    use ark_std::test_rng;
    use kzgrs_primitives::{
        encoding::{BlobCommitments, BlobVerifier, EncodingParams},
        errors::KzgError,
        rs::{ErasureCoder, RsEncoder},
        srs::{Srs, SrsProvider},
        testutils::TestSetup,
    };
    use kzgrs_verifier::verifier::Verifier;
    use lazy_static::lazy_static;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    };

    const ORDER: u64 = 64;

    lazy_static! {
        static ref SETUP: TestSetup = TestSetup::from_secret(Fr::from(0x5eed_u64), ORDER).unwrap();
        static ref SRS: Arc<dyn SrsProvider> = Arc::new(SETUP.srs().clone());
    }

    fn random_poly(len: usize) -> Vec<Fr> {
        let mut rng = test_rng();
        (0..len).map(|_| Fr::rand(&mut rng)).collect()
    }

    static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct CountingCoder(RsEncoder);

    impl ErasureCoder for CountingCoder {
        fn new(params: EncodingParams) -> Result<Self, KzgError> {
            CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Self(RsEncoder::new(params)?))
        }

        fn params(&self) -> &EncodingParams {
            self.0.params()
        }

        fn domain(&self) -> &Radix2EvaluationDomain<Fr> {
            self.0.domain()
        }

        fn decode(
            &self,
            frames: &[&[Fr]],
            indices: &[u64],
            max_input_size: u64,
        ) -> Result<Vec<u8>, KzgError> {
            self.0.decode(frames, indices, max_input_size)
        }
    }

    #[test]
    fn test_cache_returns_same_verifier() {
        let verifier = Verifier::new(SRS.clone());
        let params = EncodingParams::new(4, 8);

        let first = verifier.get_kzg_verifier(params).unwrap();
        let second = verifier.get_kzg_verifier(EncodingParams::new(4, 8)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(verifier.cached_params_count(), 1);

        let other = verifier.get_kzg_verifier(EncodingParams::new(8, 4)).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(verifier.cached_params_count(), 2);
    }

    #[test]
    fn test_concurrent_callers_build_once() {
        let verifier = Verifier::<CountingCoder>::with_coder(SRS.clone());
        let params = EncodingParams::new(2, 16);
        let num_threads = 16;
        let barrier = Barrier::new(num_threads);

        let verifiers: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..num_threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        verifier.get_kzg_verifier(params).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(verifiers.iter().all(|v| Arc::ptr_eq(v, &verifiers[0])));
        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 1);
        assert_eq!(verifier.cached_params_count(), 1);

        // bypasses the cache
        let uncached = verifier.new_kzg_verifier(params).unwrap();
        assert_eq!(uncached.params(), &params);
        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 2);
        assert_eq!(verifier.cached_params_count(), 1);

        // coset shifts come from the wrapped coder's domain
        let poly = random_poly(12);
        let commitments = SETUP.blob_commitments(&poly, 12).unwrap();
        let frames = SETUP.frames(&poly, params).unwrap();
        let indices: Vec<u64> = (0..params.num_chunks).collect();
        assert_eq!(
            verifier.verify_frames(&frames, &indices, &commitments, params),
            Ok(())
        );
        for (frame, &index) in frames.iter().zip(&indices) {
            assert_eq!(
                uncached.verify_frame(&commitments.commitment, frame, index),
                Ok(())
            );
        }
        assert!(verifier
            .verify_frames(&frames[1..], &indices[..frames.len() - 1], &commitments, params)
            .is_err());
        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_params_are_config_errors() {
        let verifier = Verifier::new(SRS.clone());
        for params in [
            EncodingParams::new(3, 4),
            EncodingParams::new(4, 3),
            EncodingParams::new(0, 4),
        ] {
            assert!(matches!(
                verifier.get_kzg_verifier(params),
                Err(KzgError::ConfigError(_))
            ));
            assert!(matches!(
                verifier.new_kzg_verifier(params),
                Err(KzgError::ConfigError(_))
            ));
        }
        assert_eq!(verifier.cached_params_count(), 0);
    }

    #[test]
    fn test_params_beyond_loaded_srs() {
        let verifier = Verifier::new(SRS.clone());
        // 128 evaluations but only 64 G1 points
        assert!(matches!(
            verifier.get_kzg_verifier(EncodingParams::new(8, 16)),
            Err(KzgError::ConfigError(_))
        ));
        assert_eq!(verifier.cached_params_count(), 0);
    }

    #[test]
    fn test_cache_capacity() {
        let verifier = Verifier::new(SRS.clone()).with_cache_capacity(1);
        let first = verifier.get_kzg_verifier(EncodingParams::new(2, 2)).unwrap();
        let a = verifier.get_kzg_verifier(EncodingParams::new(2, 4)).unwrap();
        let b = verifier.get_kzg_verifier(EncodingParams::new(2, 4)).unwrap();

        assert_eq!(verifier.cached_params_count(), 1);
        assert!(!Arc::ptr_eq(&a, &b));
        let again = verifier.get_kzg_verifier(EncodingParams::new(2, 2)).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_verify_blob_length() {
        let verifier = Verifier::new(SRS.clone());
        let poly = random_poly(10);
        let commitments = SETUP.blob_commitments(&poly, 10).unwrap();
        assert_eq!(verifier.verify_blob_length(&commitments), Ok(()));

        // a looser bound is also honest
        let loose = SETUP.blob_commitments(&poly, 16).unwrap();
        assert_eq!(verifier.verify_blob_length(&loose), Ok(()));

        // claiming a tighter bound than the proof was built for fails
        let tighter = BlobCommitments {
            length: 9,
            ..commitments
        };
        assert!(matches!(
            verifier.verify_blob_length(&tighter),
            Err(KzgError::ProofInvalid(_))
        ));
    }

    #[test]
    fn test_verify_blob_length_mutated_inputs() {
        let verifier = Verifier::new(SRS.clone());
        let poly = random_poly(10);
        let commitments = SETUP.blob_commitments(&poly, 10).unwrap();

        let mutated_proof = BlobCommitments {
            length_proof: (commitments.length_proof + G2Affine::generator()).into_affine(),
            ..commitments
        };
        assert!(matches!(
            verifier.verify_blob_length(&mutated_proof),
            Err(KzgError::ProofInvalid(_))
        ));

        let mutated_commitment = BlobCommitments {
            length_commitment: (commitments.length_commitment + G2Affine::generator())
                .into_affine(),
            ..commitments
        };
        assert!(matches!(
            verifier.verify_blob_length(&mutated_commitment),
            Err(KzgError::ProofInvalid(_))
        ));
    }

    #[test]
    fn test_verify_commit_length_equal_to_order() {
        let verifier = Verifier::new(SRS.clone());
        let poly = random_poly(20);
        let length_commitment = SETUP.length_commitment(&poly);
        let length_proof = SETUP.length_proof(&poly, ORDER as u32).unwrap();

        // the challenge is the SRS point at index 0, the generator
        assert_eq!(length_proof, length_commitment);
        assert_eq!(SRS.g1_point(0).unwrap(), G1Affine::generator());
        assert_eq!(
            verifier.verify_commit(&length_commitment, &length_proof, ORDER as u32),
            Ok(())
        );
    }

    #[test]
    fn test_verify_commit_length_out_of_range() {
        let verifier = Verifier::new(SRS.clone());
        let g2 = G2Affine::generator();
        assert!(matches!(
            verifier.verify_commit(&g2, &g2, ORDER as u32 + 1),
            Err(KzgError::IndexError(_))
        ));
        // a zero length points one past the end of the SRS
        assert!(matches!(
            verifier.verify_commit(&g2, &g2, 0),
            Err(KzgError::IndexError(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let dir = std::env::temp_dir().join(format!("kzgrs-verifier-{}", std::process::id()));
        let config = SETUP.write_srs_files(&dir, 40).unwrap();
        let verifier = Verifier::from_config(&config).unwrap();
        assert_eq!(verifier.srs().num_g1_loaded(), 40);

        let poly = random_poly(10);
        let params = EncodingParams::new(4, 8);
        // the challenge at index 54 lies past the loaded points
        let commitments = SETUP.blob_commitments(&poly, 10).unwrap();
        let frames = SETUP.frames(&poly, params).unwrap();
        let indices: Vec<u64> = (0..8).collect();

        let blob_verifier: &dyn BlobVerifier = &verifier;
        assert_eq!(blob_verifier.verify_blob_length(&commitments), Ok(()));
        assert_eq!(
            blob_verifier.verify_frames(&frames, &indices, &commitments, params),
            Ok(())
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_srs_without_files_cannot_serve_unloaded_challenge() {
        let g1 = SETUP.srs().g1()[..32].to_vec();
        let g2 = SETUP.srs().g2().to_vec();
        let srs = Srs::new(g1, g2, ORDER).unwrap();
        let verifier = Verifier::new(Arc::new(srs));

        let poly = random_poly(10);
        let commitments = SETUP.blob_commitments(&poly, 10).unwrap();
        assert!(matches!(
            verifier.verify_blob_length(&commitments),
            Err(KzgError::IndexError(_))
        ));
    }
}
