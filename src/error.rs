use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid score: {name} must be between {min}-{max} (got {value})")]
    InvalidScore {
        name: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("invalid upload filename {0:?}: expected a .nii or .nii.gz file")]
    InvalidFilename(String),
    #[error("invalid subject id {0:?}: use letters, digits, '-' or '_'")]
    InvalidSubject(String),
    #[error("segmentation preview not found at {}", .0.display())]
    MissingPreview(PathBuf),
    #[error("report generation failed: {0}")]
    ReportGeneration(String),
    #[error("segmentation failed ({status}): {output}")]
    SegmentationFailed { status: String, output: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
