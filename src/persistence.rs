//! Versioned on-disk records.
//!
//! Records are plain JSON. Floats are written in shortest round-trip form and
//! read back with `serde_json`'s `float_roundtrip` parser, so a value survives
//! a save/load cycle bit for bit.

use std::{fs, path::Path};

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Version written by this build and the only one it reads.
pub const FORMAT_VERSION: u32 = 1;

/// Fitted linear model parameters as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelRecord {
    pub format_version: u32,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Feature scaler state as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalerRecord {
    pub format_version: u32,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

/// Checks a decoded record before it is turned into live state.
pub trait Record: Serialize + DeserializeOwned {
    /// Returns a reason when the record does not describe valid state.
    fn validate(&self) -> std::result::Result<(), String>;
}

impl Record for ModelRecord {
    fn validate(&self) -> std::result::Result<(), String> {
        check_version(self.format_version)?;
        if self.coefficients.is_empty() {
            return Err("no coefficients".into());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("parameters must be finite".into());
        }
        Ok(())
    }
}

impl Record for ScalerRecord {
    fn validate(&self) -> std::result::Result<(), String> {
        check_version(self.format_version)?;
        if self.means.is_empty() {
            return Err("no columns".into());
        }
        if self.means.len() != self.scales.len() {
            return Err(format!(
                "{} means but {} scales",
                self.means.len(),
                self.scales.len()
            ));
        }
        if self.means.iter().any(|m| !m.is_finite()) {
            return Err("means must be finite".into());
        }
        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("scales must be finite and positive".into());
        }
        Ok(())
    }
}

fn check_version(version: u32) -> std::result::Result<(), String> {
    if version != FORMAT_VERSION {
        return Err(format!(
            "unsupported format version {version}, expected {FORMAT_VERSION}"
        ));
    }
    Ok(())
}

/// Writes `record` to `path`, replacing any previous content.
///
/// Missing parent directories are created.
///
/// # Errors
/// `ModelError::Io` when the directory or the file cannot be written.
pub fn write<R: Record>(path: &Path, record: &R) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ModelError::corrupt(path, format!("cannot encode record: {e}")))?;
    fs::write(path, json).map_err(|e| ModelError::io(path, e))?;

    debug!("record written to {}", path.display());
    Ok(())
}

/// Reads and validates a record from `path`.
///
/// # Errors
/// * `ModelError::Io` when the file cannot be read.
/// * `ModelError::Corrupt` when it is not a valid record.
pub fn read<R: Record>(path: &Path) -> Result<R> {
    let content = fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;

    let record: R = serde_json::from_str(&content)
        .map_err(|e| ModelError::corrupt(path, format!("invalid JSON: {e}")))?;
    record
        .validate()
        .map_err(|reason| ModelError::corrupt(path, reason))?;

    debug!("record read from {}", path.display());
    Ok(record)
}
