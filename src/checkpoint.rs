//! Versioned binary checkpoints for trained engines.
//!
//! A checkpoint is a bincode blob whose first field is a `u32` format
//! version. The version is decoded on its own before the payload so that a
//! blob written by an incompatible format is rejected with a clear error
//! instead of a codec failure halfway through the record.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ssa::SsaConfig;

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Errors that can occur while saving or loading checkpoints.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Underlying I/O failure while reading or writing checkpoint files.
    #[error("I/O error while accessing checkpoint: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization error from the binary codec.
    #[error("failed to (de)serialize checkpoint payload: {0}")]
    Serialization(#[from] bincode::Error),

    /// The blob was well formed but written by another format version.
    #[error("checkpoint version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// The blob decoded but its contents are inconsistent.
    #[error("checkpoint has invalid structure: {0}")]
    InvalidFormat(String),
}

/// Persisted state of a trained forecast engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Format version, always the first encoded field.
    pub version: u32,
    /// Configuration the engine was built with.
    pub config: SsaConfig,
    /// Buffered observations, oldest first.
    pub buffer: Vec<f64>,
    /// Recurrence coefficients, oldest lag first.
    pub coefficients: Vec<f64>,
    /// Residual variance of the training reconstruction.
    pub residual_variance: f64,
    /// Number of spectral components used at training.
    pub rank: usize,
}

impl EngineSnapshot {
    /// Check that the decoded record describes a usable trained engine.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        self.config
            .validate()
            .map_err(|e| CheckpointError::InvalidFormat(e.to_string()))?;

        if self.buffer.len() != self.config.series_length {
            return Err(CheckpointError::InvalidFormat(format!(
                "buffer holds {} values but series length is {}",
                self.buffer.len(),
                self.config.series_length
            )));
        }
        if self.coefficients.len() + 1 != self.config.window_size {
            return Err(CheckpointError::InvalidFormat(format!(
                "{} recurrence coefficients do not match window size {}",
                self.coefficients.len(),
                self.config.window_size
            )));
        }
        if let Some(bad) = self.buffer.iter().find(|v| !v.is_finite()) {
            return Err(CheckpointError::InvalidFormat(format!(
                "buffer contains non-finite value {}",
                bad
            )));
        }
        if let Some(bad) = self.coefficients.iter().find(|a| !a.is_finite()) {
            return Err(CheckpointError::InvalidFormat(format!(
                "recurrence coefficients contain non-finite value {}",
                bad
            )));
        }
        if !self.residual_variance.is_finite() || self.residual_variance < 0.0 {
            return Err(CheckpointError::InvalidFormat(format!(
                "residual variance {} is not a finite non-negative number",
                self.residual_variance
            )));
        }
        // A full-rank basis admits no recurrence.
        if self.rank == 0 || self.rank >= self.config.window_size {
            return Err(CheckpointError::InvalidFormat(format!(
                "rank {} is outside 1..{}",
                self.rank, self.config.window_size
            )));
        }
        Ok(())
    }
}

/// Deterministic binary codec options shared by every checkpoint.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_little_endian()
}

/// Encode a snapshot into an opaque blob.
pub fn encode(snapshot: &EngineSnapshot) -> Result<Vec<u8>, CheckpointError> {
    Ok(codec().serialize(snapshot)?)
}

/// Decode and validate a blob produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<EngineSnapshot, CheckpointError> {
    let found: u32 = codec().deserialize(bytes)?;
    if found != CHECKPOINT_VERSION {
        return Err(CheckpointError::VersionMismatch {
            expected: CHECKPOINT_VERSION,
            found,
        });
    }

    let snapshot: EngineSnapshot = codec().deserialize(bytes)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Write a snapshot to `path`, creating parent directories as needed.
pub fn write_snapshot<P: AsRef<Path>>(
    snapshot: &EngineSnapshot,
    path: P,
) -> Result<(), CheckpointError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let bytes = encode(snapshot)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read and validate a snapshot from `path`.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<EngineSnapshot, CheckpointError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}
