use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Serialize)]
pub struct IngestedScan {
    pub subject_id: String,
    pub upload_path: PathBuf,
    pub compressed_path: PathBuf,
}

pub fn is_nifti_filename(filename: &str) -> bool {
    let stem = filename
        .strip_suffix(".nii.gz")
        .or_else(|| filename.strip_suffix(".nii"));
    stem.is_some_and(|s| !s.is_empty())
}

pub fn validate_subject_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AppError::InvalidSubject(id.to_string()))
    }
}

pub fn new_subject_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn compressed_scan_path(storage: &StorageConfig, subject_id: &str) -> PathBuf {
    storage.output_dir.join(format!("{subject_id}_T1w.nii.gz"))
}

/// Persists an uploaded scan and stages a gzip-compressed copy for segmentation.
pub fn ingest_upload(
    source: &Path,
    filename: &str,
    subject_id: Option<&str>,
    storage: &StorageConfig,
) -> Result<IngestedScan> {
    let basename = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !is_nifti_filename(basename) {
        return Err(AppError::InvalidFilename(filename.to_string()));
    }
    let subject_id = match subject_id {
        Some(id) => {
            validate_subject_id(id)?;
            id.to_string()
        }
        None => new_subject_id(),
    };

    fs::create_dir_all(&storage.upload_dir)?;
    fs::create_dir_all(&storage.output_dir)?;

    let upload_path = storage.upload_dir.join(format!("{subject_id}_{basename}"));
    let same_file =
        upload_path.exists() && fs::canonicalize(source)? == fs::canonicalize(&upload_path)?;
    if !same_file {
        fs::copy(source, &upload_path)?;
    }

    let compressed_path = compressed_scan_path(storage, &subject_id);
    if basename.ends_with(".gz") && has_gzip_magic(&upload_path)? {
        fs::copy(&upload_path, &compressed_path)?;
    } else {
        if basename.ends_with(".gz") {
            warn!(
                path = %upload_path.display(),
                "upload named .gz is not gzip data; compressing"
            );
        }
        info!(path = %upload_path.display(), "compressing scan");
        gzip_file(&upload_path, &compressed_path)?;
    }

    info!(
        subject = %subject_id,
        compressed = %compressed_path.display(),
        "scan ingested"
    );
    Ok(IngestedScan {
        subject_id,
        upload_path,
        compressed_path,
    })
}

pub fn gzip_file(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(src)?);
    let writer = BufWriter::new(File::create(dst)?);
    let mut encoder = GzEncoder::new(writer, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

fn has_gzip_magic(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; 2];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/upload.rs"]
mod tests;
