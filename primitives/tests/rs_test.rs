use ark_bn254::Fr;
use ark_std::{test_rng, UniformRand};
use kzgrs_primitives::{
    encoding::EncodingParams,
    errors::KzgError,
    helpers::to_byte_array,
    rs::{ErasureCoder, RsEncoder},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const NUM_ELEMENTS: usize = 10;

fn setup() -> (RsEncoder, Vec<Fr>, Vec<Vec<Fr>>) {
    let mut rng = test_rng();
    let encoder = RsEncoder::new(EncodingParams::new(4, 8)).unwrap();
    let input: Vec<Fr> = (0..NUM_ELEMENTS).map(|_| Fr::rand(&mut rng)).collect();
    let chunks = encoder.encode(&input).unwrap();
    (encoder, input, chunks)
}

fn decode(
    encoder: &RsEncoder,
    chunks: &[Vec<Fr>],
    indices: &[u64],
    max_input_size: u64,
) -> Result<Vec<u8>, KzgError> {
    let frames: Vec<&[Fr]> = indices
        .iter()
        .map(|&i| chunks[i as usize].as_slice())
        .collect();
    encoder.decode(&frames, indices, max_input_size)
}

#[test]
fn test_decode_from_all_chunks() {
    let (encoder, input, chunks) = setup();
    let max_input_size = (NUM_ELEMENTS * 32) as u64;
    let indices: Vec<u64> = (0..8).collect();
    let decoded = decode(&encoder, &chunks, &indices, max_input_size).unwrap();
    assert_eq!(decoded, to_byte_array(&input, max_input_size as usize));
}

#[test]
fn test_decode_from_random_sufficient_subsets() {
    let (encoder, input, chunks) = setup();
    let max_input_size = (NUM_ELEMENTS * 32 - 7) as u64;
    let expected = to_byte_array(&input, max_input_size as usize);
    assert_eq!(expected.len(), max_input_size as usize);

    // 10 field elements over chunks of 4 need 3 chunks
    let mut rng = StdRng::seed_from_u64(7);
    let mut indices: Vec<u64> = (0..8).collect();
    for _ in 0..10 {
        indices.shuffle(&mut rng);
        let subset = &indices[..3];
        assert_eq!(decode(&encoder, &chunks, subset, max_input_size).unwrap(), expected);
    }
}

#[test]
fn test_decode_large_domain_with_half_the_chunks() {
    // 8192 field elements spread over 16384 evaluations
    let params = EncodingParams::new(8, 2048);
    let encoder = RsEncoder::new(params).unwrap();
    let mut rng = StdRng::seed_from_u64(2048);
    let input: Vec<Fr> = (0..8192).map(|_| Fr::rand(&mut rng)).collect();
    let chunks = encoder.encode(&input).unwrap();

    let max_input_size = (input.len() * 32) as u64;
    let needed = params.num_sys(max_input_size);
    assert_eq!(needed, 1024);

    let mut indices: Vec<u64> = (0..params.num_chunks).collect();
    indices.shuffle(&mut rng);
    let subset = &indices[..needed as usize];
    let decoded = decode(&encoder, &chunks, subset, max_input_size).unwrap();
    assert_eq!(decoded, to_byte_array(&input, max_input_size as usize));

    // one chunk short of the payload
    let result = decode(&encoder, &chunks, &subset[1..], max_input_size);
    assert!(matches!(result, Err(KzgError::DecodeError(_))));
}

#[test]
fn test_decode_insufficient_chunks() {
    let (encoder, _, chunks) = setup();
    let result = decode(&encoder, &chunks, &[1, 6], (NUM_ELEMENTS * 32) as u64);
    assert!(matches!(result, Err(KzgError::DecodeError(_))));

    // a repeated chunk adds no new evaluations
    let result = decode(&encoder, &chunks, &[1, 6, 6], (NUM_ELEMENTS * 32) as u64);
    assert!(matches!(result, Err(KzgError::DecodeError(_))));
}

#[test]
fn test_decode_conflicting_duplicate_index() {
    let (encoder, _, chunks) = setup();
    let mut tampered = chunks[2].clone();
    tampered[0] += Fr::from(1u64);
    let frames: Vec<&[Fr]> = vec![
        chunks[0].as_slice(),
        chunks[2].as_slice(),
        tampered.as_slice(),
        chunks[5].as_slice(),
    ];
    let result = encoder.decode(&frames, &[0, 2, 2, 5], (NUM_ELEMENTS * 32) as u64);
    assert!(matches!(result, Err(KzgError::DecodeError(_))));
}

#[test]
fn test_decode_rejects_inconsistent_input() {
    let (encoder, _, chunks) = setup();
    let frames: Vec<&[Fr]> = vec![chunks[0].as_slice(), chunks[1].as_slice(), chunks[2].as_slice()];

    let out_of_range = encoder.decode(&frames, &[0, 1, 8], 320);
    assert!(matches!(out_of_range, Err(KzgError::DecodeError(_))));

    let mismatched = encoder.decode(&frames, &[0, 1], 320);
    assert!(matches!(mismatched, Err(KzgError::DecodeError(_))));

    let short = [Fr::from(1u64)];
    let short_frames: Vec<&[Fr]> = vec![chunks[0].as_slice(), chunks[1].as_slice(), &short[..]];
    let wrong_length = encoder.decode(&short_frames, &[0, 1, 2], 320);
    assert!(matches!(wrong_length, Err(KzgError::DecodeError(_))));

    let too_large = encoder.decode(&frames, &[0, 1, 2], 33 * 32);
    assert!(matches!(too_large, Err(KzgError::DecodeError(_))));
}

#[test]
fn test_encode_rejects_oversized_input() {
    let encoder = RsEncoder::new(EncodingParams::new(2, 2)).unwrap();
    assert!(matches!(
        encoder.encode(&[Fr::from(1u64); 5]),
        Err(KzgError::InvalidInputLength)
    ));
}

#[test]
fn test_new_rejects_invalid_params() {
    assert!(matches!(
        RsEncoder::new(EncodingParams::new(3, 8)),
        Err(KzgError::ConfigError(_))
    ));
}
