//! Compressed archive persistence for finalized models.
//!
//! A parsed model can be saved to disk and reloaded later, so the expensive
//! parse of a large job log only happens once. The on-disk format is a
//! gzip-compressed JSON document with a small versioned wrapper around the
//! model itself.

use crate::aggregator::RunModel;
use crate::utils::config::ARCHIVE_VERSION;
use crate::utils::error::ArchiveError;
use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A loaded archive: the model plus its wrapper metadata
///
/// **Public** - returned by `load`
#[derive(Debug, Deserialize)]
pub struct Archive {
    /// Archive format version the file was written with
    pub version: String,

    /// RFC 3339 timestamp of when the archive was written
    pub generated_at: String,

    /// The archived model
    pub model: RunModel,
}

/// Borrowed counterpart of `Archive` used when writing
#[derive(Serialize)]
struct ArchivePayload<'a> {
    version: &'a str,
    generated_at: String,
    model: &'a RunModel,
}

/// Save a model to a compressed archive file
///
/// **Public** - main entry point for persistence
///
/// # Arguments
/// * `model` - The finalized model to archive
/// * `path` - Destination file, parent directories are created if needed
///
/// # Errors
/// * `ArchiveError::IoError` - File creation or write failure
/// * `ArchiveError::SerializationFailed` - JSON serialization failure
pub fn save(model: &RunModel, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
    let path = path.as_ref();

    info!("Writing model archive to: {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    let payload = ArchivePayload {
        version: ARCHIVE_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        model,
    };

    serde_json::to_writer(&mut encoder, &payload)?;
    encoder.finish()?.flush()?;

    Ok(())
}

/// Load an archive from disk
///
/// **Public** - counterpart of `save`
///
/// # Errors
/// * `ArchiveError::IoError` - File open or read failure
/// * `ArchiveError::SerializationFailed` - Corrupt or non-archive content
/// * `ArchiveError::VersionMismatch` - Written by an incompatible version
pub fn load(path: impl AsRef<Path>) -> Result<Archive, ArchiveError> {
    let path = path.as_ref();

    debug!("Reading model archive from: {}", path.display());

    let file = File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));

    let archive: Archive = serde_json::from_reader(decoder)?;
    check_version(&archive.version)?;

    debug!(
        "Archive loaded: version {}, written {}",
        archive.version, archive.generated_at
    );

    Ok(archive)
}

/// Load just the model, discarding the wrapper metadata
///
/// **Public** - convenience for callers that only want the data
pub fn load_model(path: impl AsRef<Path>) -> Result<RunModel, ArchiveError> {
    Ok(load(path)?.model)
}

/// Reject archives written with an incompatible major version
///
/// **Private** - internal validation
fn check_version(found: &str) -> Result<(), ArchiveError> {
    let major = |version: &str| version.split('.').next().unwrap_or(version).to_string();

    if major(found) != major(ARCHIVE_VERSION) {
        return Err(ArchiveError::VersionMismatch {
            found: found.to_string(),
            expected: ARCHIVE_VERSION.to_string(),
        });
    }

    Ok(())
}
