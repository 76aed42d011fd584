use ark_bn254::{G1Affine, G2Affine};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::{config::KzgConfig, errors::KzgError, traits::ReadPointFromBytes};

/// Read access to the structured reference string `[τ^i]_1`, `[τ^i]_2` for
/// `i` in `0..order`.
pub trait SrsProvider: Debug + Send + Sync {
    /// Total number of points in the trusted setup.
    fn order(&self) -> u64;

    /// Number of leading G1 points held in memory.
    fn num_g1_loaded(&self) -> u64;

    fn g1_point(&self, index: u64) -> Result<G1Affine, KzgError>;

    /// G1 points `[start, end)`.
    fn g1_points(&self, start: u64, end: u64) -> Result<Vec<G1Affine>, KzgError>;

    fn g2_point(&self, index: u64) -> Result<G2Affine, KzgError>;
}

/// SRS held in memory, optionally backed by the point files for indices
/// that were not loaded.
///
/// G2 points are served from the loaded prefix, the trailing section
/// `[order - g2_trailing.len(), order)`, the power-of-two table (index
/// `2^i` at position `i`) or, as a last resort, the G2 file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Srs {
    g1: Vec<G1Affine>,
    g2: Vec<G2Affine>,
    g2_trailing: Vec<G2Affine>,
    g2_power_of_2: Vec<G2Affine>,
    order: u64,
    g1_path: Option<PathBuf>,
    g2_path: Option<PathBuf>,
}

impl Srs {
    pub fn new(g1: Vec<G1Affine>, g2: Vec<G2Affine>, order: u64) -> Result<Self, KzgError> {
        if g1.len() as u64 > order || g2.len() as u64 > order {
            return Err(KzgError::ConfigError(format!(
                "{} G1 and {} G2 points exceed SRS order {}",
                g1.len(),
                g2.len(),
                order
            )));
        }
        Ok(Self {
            g1,
            g2,
            order,
            ..Default::default()
        })
    }

    /// Points `[order - g2_trailing.len(), order)` of the G2 sequence.
    pub fn with_g2_trailing(mut self, g2_trailing: Vec<G2Affine>) -> Result<Self, KzgError> {
        if g2_trailing.len() as u64 > self.order {
            return Err(KzgError::ConfigError(format!(
                "{} trailing G2 points exceed SRS order {}",
                g2_trailing.len(),
                self.order
            )));
        }
        self.g2_trailing = g2_trailing;
        Ok(self)
    }

    /// `[τ^(2^i)]_2` for consecutive `i` starting at 0.
    pub fn with_g2_power_of_2(mut self, g2_power_of_2: Vec<G2Affine>) -> Self {
        self.g2_power_of_2 = g2_power_of_2;
        self
    }

    /// Loads the SRS described by `config`: the first `srs_number_to_load`
    /// G1 points, and either the G2 prefix plus the trailing G2 section or
    /// the power-of-two G2 table.
    pub fn from_config(config: &KzgConfig) -> Result<Self, KzgError> {
        config.validate()?;
        let start = Instant::now();
        let n = config.srs_number_to_load;

        let g1 = parallel_read_points::<G1Affine>(&config.g1_path, 0, n, config.num_worker)?;
        let mut srs = Self::new(g1, Vec::new(), config.srs_order)?;
        srs.g1_path = Some(PathBuf::from(&config.g1_path));

        if config.load_g2_points {
            srs.g2 = parallel_read_points::<G2Affine>(&config.g2_path, 0, n, config.num_worker)?;
            srs.g2_trailing = parallel_read_points::<G2Affine>(
                &config.g2_path,
                config.srs_order - n,
                n,
                config.num_worker,
            )?;
            srs.g2_path = Some(PathBuf::from(&config.g2_path));
        } else {
            let count = points_in_file::<G2Affine>(&config.g2_power_of_2_path)?;
            srs.g2_power_of_2 = parallel_read_points::<G2Affine>(
                &config.g2_power_of_2_path,
                0,
                count,
                config.num_worker,
            )?;
        }

        let elapsed = start.elapsed();
        if config.verbose {
            info!(
                order = srs.order,
                g1_points = srs.g1.len(),
                g2_points = srs.g2.len(),
                g2_trailing_points = srs.g2_trailing.len(),
                g2_power_of_2_points = srs.g2_power_of_2.len(),
                num_worker = config.num_worker,
                elapsed_ms = elapsed.as_millis() as u64,
                "loaded SRS"
            );
        } else {
            debug!(
                order = srs.order,
                g1_points = srs.g1.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "loaded SRS"
            );
        }
        Ok(srs)
    }

    pub fn g1(&self) -> &[G1Affine] {
        &self.g1
    }

    pub fn g2(&self) -> &[G2Affine] {
        &self.g2
    }

    fn check_index(&self, index: u64) -> Result<(), KzgError> {
        if index >= self.order {
            return Err(KzgError::IndexError(format!(
                "SRS index {} is out of range for order {}",
                index, self.order
            )));
        }
        Ok(())
    }
}

impl SrsProvider for Srs {
    fn order(&self) -> u64 {
        self.order
    }

    fn num_g1_loaded(&self) -> u64 {
        self.g1.len() as u64
    }

    fn g1_point(&self, index: u64) -> Result<G1Affine, KzgError> {
        self.check_index(index)?;
        if let Some(point) = self.g1.get(index as usize) {
            return Ok(*point);
        }
        match &self.g1_path {
            Some(path) => read_point_at::<G1Affine>(path, index),
            None => Err(KzgError::IndexError(format!(
                "G1 point {} is not loaded",
                index
            ))),
        }
    }

    fn g1_points(&self, start: u64, end: u64) -> Result<Vec<G1Affine>, KzgError> {
        if start > end {
            return Err(KzgError::IndexError(format!(
                "invalid G1 range [{}, {})",
                start, end
            )));
        }
        if end > self.order {
            return Err(KzgError::IndexError(format!(
                "G1 range end {} is out of range for order {}",
                end, self.order
            )));
        }
        if let Some(points) = self.g1.get(start as usize..end as usize) {
            return Ok(points.to_vec());
        }
        (start..end).map(|i| self.g1_point(i)).collect()
    }

    fn g2_point(&self, index: u64) -> Result<G2Affine, KzgError> {
        self.check_index(index)?;
        if let Some(point) = self.g2.get(index as usize) {
            return Ok(*point);
        }

        let trailing_start = self.order - self.g2_trailing.len() as u64;
        if index >= trailing_start {
            return Ok(self.g2_trailing[(index - trailing_start) as usize]);
        }

        if index.is_power_of_two() {
            if let Some(point) = self.g2_power_of_2.get(index.trailing_zeros() as usize) {
                return Ok(*point);
            }
        }

        match &self.g2_path {
            Some(path) => read_point_at::<G2Affine>(path, index),
            None => Err(KzgError::IndexError(format!(
                "G2 point {} is not loaded",
                index
            ))),
        }
    }
}

fn points_in_file<P: ReadPointFromBytes>(file_path: &str) -> Result<u64, KzgError> {
    let len = std::fs::metadata(file_path)
        .map_err(|e| {
            error!(path = file_path, error = %e, "cannot stat SRS file");
            KzgError::from(e)
        })?
        .len();
    Ok(len / P::COMPRESSED_SIZE as u64)
}

/// Reads the single point at `index` by seeking in the point file.
pub fn read_point_at<P: ReadPointFromBytes>(path: &Path, index: u64) -> Result<P, KzgError> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(index * P::COMPRESSED_SIZE as u64))?;
    let mut buffer = vec![0u8; P::COMPRESSED_SIZE];
    file.read_exact(&mut buffer)?;
    Ok(P::read_point_from_bytes_be(&buffer)?)
}

/// Reads `count` points starting at point `start` of a file, by creating one
/// reader thread which reads the raw bytes and fans them out to `num_workers`
/// threads that parse them. The parsed points are sorted back by their
/// position in the file.
pub fn parallel_read_points<P>(
    file_path: &str,
    start: u64,
    count: u64,
    num_workers: usize,
) -> Result<Vec<P>, KzgError>
where
    P: ReadPointFromBytes + Send + 'static,
{
    // Channel contains (bytes, position) tuples. The position is used to
    // reorder the points after processing them.
    let (sender, receiver) = bounded::<(Vec<u8>, usize)>(1000);

    let path = file_path.to_owned();
    let reader_handle = std::thread::spawn(move || {
        read_file_chunks(&path, sender, P::COMPRESSED_SIZE, start, count)
    });

    let workers: Vec<_> = (0..num_workers.max(1))
        .map(|_| {
            let receiver = receiver.clone();
            std::thread::spawn(move || process_chunks::<P>(receiver))
        })
        .collect();
    // Only the workers may keep the channel open, so the reader stops if they all fail.
    drop(receiver);

    let read_result = reader_handle
        .join()
        .map_err(|_| KzgError::GenericError("Reader thread panicked.".to_string()))?;

    let mut all_points = Vec::with_capacity(count as usize);
    let mut parse_error = None;
    for worker in workers {
        match worker.join() {
            Ok(Ok(points)) => all_points.extend(points),
            Ok(Err(e)) => parse_error = Some(e),
            Err(_) => {
                return Err(KzgError::GenericError(
                    "Worker thread panicked.".to_string(),
                ))
            },
        }
    }

    if let Err(e) = read_result {
        error!(path = file_path, start, count, error = %e, "failed to read SRS points");
        return Err(e.into());
    }
    if let Some(e) = parse_error {
        error!(path = file_path, error = %e, "failed to parse SRS points");
        return Err(e);
    }

    all_points.sort_by_key(|&(_, position)| position);

    if all_points.len() as u64 != count {
        return Err(KzgError::ConfigError(format!(
            "Expected {} points, but got {}.",
            count,
            all_points.len()
        )));
    }

    Ok(all_points.into_iter().map(|(point, _)| point).collect())
}

fn process_chunks<P: ReadPointFromBytes>(
    receiver: Receiver<(Vec<u8>, usize)>,
) -> Result<Vec<(P, usize)>, KzgError> {
    receiver
        .iter()
        .map(|(chunk, position)| -> Result<(P, usize), KzgError> {
            let point = P::read_point_from_bytes_be(&chunk)?;
            Ok((point, position))
        })
        .collect()
}

fn read_file_chunks(
    file_path: &str,
    sender: Sender<(Vec<u8>, usize)>,
    point_size: usize,
    start: u64,
    num_points: u64,
) -> io::Result<()> {
    let mut file = File::open(file_path)?;
    file.seek(SeekFrom::Start(start * point_size as u64))?;
    let mut reader = BufReader::new(file);

    for position in 0..num_points as usize {
        let mut buffer = vec![0u8; point_size];
        reader.read_exact(&mut buffer)?;
        if sender.send((buffer, position)).is_err() {
            // every worker stopped on a parse error
            break;
        }
    }
    Ok(())
}
