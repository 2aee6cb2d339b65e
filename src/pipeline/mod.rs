use std::time::Instant;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::input::upload::validate_subject_id;
use crate::model::scores::CognitiveScores;
use crate::model::thresholds::ClassifierThresholds;
use crate::pipeline::stage3_biomarkers::run_stage3;
use crate::pipeline::stage4_classify::classify_scores;
use crate::pipeline::stage5_narrative::{NarrativeClient, run_stage5};
use crate::pipeline::stage6_report::{Stage6Input, Stage6Output, run_stage6};

pub mod stage2_segment;
pub mod stage3_biomarkers;
pub mod stage4_classify;
pub mod stage5_narrative;
pub mod stage6_report;

/// Runs `f` with start/finish logging and elapsed time.
pub fn timed<T, F>(stage: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    info!(stage, "stage started");
    let result = f();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(stage, elapsed_ms, "stage finished"),
        Err(err) => warn!(stage, elapsed_ms, error = %err, "stage failed"),
    }
    result
}

/// Biomarker extraction, staging, narrative and report assembly for one
/// already segmented subject.
pub fn run_analysis(
    config: &Config,
    client: Option<&dyn NarrativeClient>,
    subject_id: &str,
    scores: &CognitiveScores,
) -> Result<Stage6Output> {
    validate_subject_id(subject_id)?;
    let preview_path = config.preview_path(subject_id);
    if !preview_path.is_file() {
        return Err(AppError::MissingPreview(preview_path));
    }

    let stats_dir = config.storage.stats_dir(subject_id);
    let extraction = timed("biomarkers", || Ok(run_stage3(&stats_dir)))?;
    if extraction.files_found == 0 {
        warn!(
            subject = subject_id,
            stats_dir = %stats_dir.display(),
            "no statistics files found; biomarkers are empty"
        );
    }
    let stage = timed("classify", || {
        Ok(classify_scores(scores, &ClassifierThresholds::default_v1()))
    })?;
    info!(subject = subject_id, stage = stage.code(), "stage classified");

    let narrative = timed("narrative", || {
        run_stage5(client, &extraction.biomarkers, scores, stage)
    })?;

    timed("report", || {
        run_stage6(&Stage6Input {
            subject_id,
            scores,
            extraction: &extraction,
            stage,
            narrative: &narrative,
            preview_path: &preview_path,
        })
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
