use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use crate::error::{AppError, Result};
use crate::model::scores::CognitiveScores;
use crate::model::stage::StageLabel;
use crate::pipeline::stage3_biomarkers::Stage3Output;
use crate::pipeline::stage5_narrative::Narrative;
use crate::report::AnalysisResponse;
use crate::report::pdf::render_pdf;

#[derive(Debug, Clone)]
pub struct Stage6Input<'a> {
    pub subject_id: &'a str,
    pub scores: &'a CognitiveScores,
    pub extraction: &'a Stage3Output,
    pub stage: StageLabel,
    pub narrative: &'a Narrative,
    pub preview_path: &'a Path,
}

#[derive(Debug, Clone)]
pub struct Stage6Output {
    pub response: AnalysisResponse,
    pub pdf: Vec<u8>,
}

pub fn read_preview(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(AppError::MissingPreview(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn run_stage6(input: &Stage6Input<'_>) -> Result<Stage6Output> {
    let preview = read_preview(input.preview_path)?;
    let pdf = render_pdf(&input.narrative.text)?;
    info!(
        preview_bytes = preview.len(),
        pdf_bytes = pdf.len(),
        "report assembled"
    );

    let response = AnalysisResponse {
        tool: env!("CARGO_PKG_NAME").to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        subject_id: input.subject_id.to_string(),
        scores: *input.scores,
        biomarkers: input.extraction.biomarkers,
        stage: input.stage,
        narrative: input.narrative.text.clone(),
        narrative_source: input.narrative.source,
        parse_audit: input.extraction.audit,
        segmentation_image: STANDARD.encode(&preview),
        pdf_report: STANDARD.encode(&pdf),
    };

    Ok(Stage6Output { response, pdf })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
