pub mod json;
pub mod pdf;
pub mod text;

use serde::Serialize;

use crate::input::stats::ParseAudit;
use crate::model::biomarkers::BiomarkerSet;
use crate::model::scores::CognitiveScores;
use crate::model::stage::StageLabel;
use crate::pipeline::stage5_narrative::NarrativeSource;

/// Analysis boundary payload. Images are base64 encoded.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub tool: String,
    pub tool_version: String,
    pub subject_id: String,
    pub scores: CognitiveScores,
    pub biomarkers: BiomarkerSet,
    pub stage: StageLabel,
    pub narrative: String,
    pub narrative_source: NarrativeSource,
    pub parse_audit: ParseAudit,
    pub segmentation_image: String,
    pub pdf_report: String,
}
