use serde::{Deserialize, Serialize};

use crate::errors::KzgError;

/// Where to find the SRS and how much of it to load.
///
/// The point files hold consecutive gnark compressed points: `g1_path` has
/// `[τ^i]_1` and `g2_path` has `[τ^i]_2` for `i` in `0..srs_order`, while
/// `g2_power_of_2_path` holds `[τ^(2^i)]_2` for `i` in `0..=28`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KzgConfig {
    pub g1_path: String,
    pub g2_path: String,
    pub g2_power_of_2_path: String,
    /// Total number of points in the trusted setup.
    pub srs_order: u64,
    /// Number of leading G1 (and G2) points kept in memory.
    pub srs_number_to_load: u64,
    /// Parser threads used while loading point files.
    pub num_worker: usize,
    /// Load the full G2 prefix and trailing section instead of the
    /// power-of-two table.
    pub load_g2_points: bool,
    /// Upper bound on cached per-parameter verifiers. `None` is unbounded.
    pub verifier_cache_capacity: Option<usize>,
    pub verbose: bool,
}

impl Default for KzgConfig {
    fn default() -> Self {
        Self {
            g1_path: String::new(),
            g2_path: String::new(),
            g2_power_of_2_path: String::new(),
            srs_order: 0,
            srs_number_to_load: 0,
            num_worker: num_cpus::get(),
            load_g2_points: true,
            verifier_cache_capacity: None,
            verbose: false,
        }
    }
}

impl KzgConfig {
    pub fn validate(&self) -> Result<(), KzgError> {
        if self.srs_number_to_load > self.srs_order {
            return Err(KzgError::ConfigError(
                "SRSOrder is less than srsNumberToLoad".to_string(),
            ));
        }
        if self.g1_path.is_empty() {
            return Err(KzgError::ConfigError("G1Path is empty".to_string()));
        }
        if self.load_g2_points && self.g2_path.is_empty() {
            return Err(KzgError::ConfigError(
                "G2Path is empty. However, object needs to load G2Points".to_string(),
            ));
        }
        if !self.load_g2_points && self.g2_power_of_2_path.is_empty() {
            return Err(KzgError::ConfigError(
                "G2PowerOf2Path is empty. However, object needs to load G2Points".to_string(),
            ));
        }
        if self.num_worker == 0 {
            return Err(KzgError::ConfigError(
                "num_worker must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
