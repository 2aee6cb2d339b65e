use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::stage::StageLabel;
use crate::pipeline::stage5_narrative::{NarrativeError, NarrativeSource};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!(
        "kira_neuroreport_pipeline_{}_{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

struct Unreachable;

impl NarrativeClient for Unreachable {
    fn complete(&self, _system: &str, _prompt: &str) -> std::result::Result<String, NarrativeError> {
        Err(NarrativeError::Connection("no route to host".to_string()))
    }
}

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.output_dir = dir.to_path_buf();
    config
}

fn write_subject(config: &Config, subject: &str) {
    let stats = config.storage.stats_dir(subject);
    fs::create_dir_all(&stats).unwrap();
    fs::write(
        stats.join("aseg+DKT.stats"),
        "# header\n  1 17 3000 3000.0 Left-Hippocampus\n  2 53 2900 2900.0 Right-Hippocampus\n  3 4 2000 2000.0 Left-Lateral-Ventricle\n",
    )
    .unwrap();
    let preview = config.preview_path(subject);
    fs::create_dir_all(preview.parent().unwrap()).unwrap();
    fs::write(&preview, b"png").unwrap();
}

#[test]
fn test_timed_passes_through() {
    assert_eq!(timed("t", || Ok(7)).unwrap(), 7);
    let err = timed::<(), _>("t", || Err(AppError::Config("x".to_string()))).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_analysis_with_unreachable_service() {
    let dir = make_temp_dir();
    let config = config_in(&dir);
    write_subject(&config, "subj-a");

    let scores = CognitiveScores::new(19, 1.0, 38.0).unwrap();
    let out = run_analysis(&config, Some(&Unreachable), "subj-a", &scores).unwrap();

    assert_eq!(out.response.stage, StageLabel::Alzheimers);
    assert_eq!(out.response.narrative_source, NarrativeSource::Fallback);
    assert!(out.response.narrative.contains("Alzheimer's"));
    assert!(out.response.narrative.contains("Ventricular Enlargement: Abnormal"));
    assert_eq!(out.response.biomarkers.left_hippocampus, 3000.0);
    assert!(!out.pdf.is_empty());
}

#[test]
fn test_analysis_requires_preview() {
    let dir = make_temp_dir();
    let config = config_in(&dir);
    let scores = CognitiveScores::new(29, 0.0, 2.0).unwrap();
    let err = run_analysis(&config, None, "nobody", &scores).unwrap_err();
    assert!(matches!(err, AppError::MissingPreview(_)));
}

#[test]
fn test_analysis_rejects_unsafe_subject() {
    let dir = make_temp_dir();
    let config = config_in(&dir);
    let scores = CognitiveScores::new(29, 0.0, 2.0).unwrap();
    let err = run_analysis(&config, None, "../x", &scores).unwrap_err();
    assert!(matches!(err, AppError::InvalidSubject(_)));
}
