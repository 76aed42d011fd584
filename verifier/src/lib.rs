//! Verification of EigenDA chunks against bn254 KZG commitments.
//!
//! A node receiving chunks of a blob checks each of them against the blob
//! commitment with [`verifier::Verifier::verify_frames`], checks the blob
//! length bound with [`verifier::Verifier::verify_blob_length`], and once
//! enough chunks passed rebuilds the blob with
//! [`verifier::Verifier::decode`].
//!
//! ```rust,no_run
//! use kzgrs_primitives::{config::KzgConfig, encoding::EncodingParams};
//! use kzgrs_verifier::verifier::Verifier;
//!
//! let config = KzgConfig {
//!     g1_path: "resources/g1.point".to_string(),
//!     g2_path: "resources/g2.point".to_string(),
//!     srs_order: 3000,
//!     srs_number_to_load: 3000,
//!     ..Default::default()
//! };
//! let verifier = Verifier::from_config(&config).unwrap();
//! let params = EncodingParams::new(64, 32);
//! let parametrized = verifier.get_kzg_verifier(params).unwrap();
//! assert_eq!(parametrized.params(), &params);
//! ```

pub mod parametrized;
pub mod verifier;
pub mod verify;
