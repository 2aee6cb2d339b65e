use std::fmt::Write;

use crate::model::biomarkers::BiomarkerSet;
use crate::model::scores::CognitiveScores;
use crate::model::stage::StageLabel;
use crate::model::thresholds::ReferenceRanges;

pub const SYSTEM_PROMPT: &str = "You are a neurology specialist analyzing dementia cases.";

pub const RECOMMENDATIONS: [&str; 3] = [
    "Clinical correlation required",
    "Follow-up neuropsychological testing",
    "Consider CSF biomarker analysis",
];

pub fn render_prompt(biomarkers: &BiomarkerSet, scores: &CognitiveScores) -> String {
    let refs = ReferenceRanges::default_v1();
    let thickness = format_thickness(biomarkers.average_cortical_thickness);
    let mut out = String::new();

    out.push_str("**Patient Cognitive Assessment Results**\n\n");
    out.push_str("|| Normal Range | Patient Value |\n");
    out.push_str("|---|---|---|\n");
    let _ = writeln!(out, "| MMSE | {} | {} |", refs.mmse_normal, scores.mmse);
    let _ = writeln!(out, "| CDR | {} | {} |", refs.cdr_normal, scores.cdr);
    let _ = writeln!(out, "| ADAS-Cog | {} | {} |", refs.adas_normal, scores.adas);
    out.push('\n');

    out.push_str("**MRI Biomarkers:**\n");
    let _ = writeln!(
        out,
        "- Hippocampal Volume (L/R): {:.2}/{:.2} mm³",
        biomarkers.left_hippocampus, biomarkers.right_hippocampus
    );
    let _ = writeln!(
        out,
        "- Hemispheric Asymmetry: {:.2} (0-{} normal)",
        biomarkers.asymmetry_index, refs.asymmetry_normal_max
    );
    let _ = writeln!(
        out,
        "- Ventricular Enlargement (Evans): {:.2} (<{} normal)",
        biomarkers.evans_index, refs.evans_normal_max
    );
    let _ = writeln!(out, "- Cortical Thickness: {thickness} mm");
    out.push('\n');

    out.push_str("Generate a clinical report with:\n");
    out.push_str("1. **Key Findings** - Bullet points of abnormal results\n");
    out.push_str("2. **Differential Diagnosis** - Possible conditions\n");
    out.push_str("3. **Confidence Level** - Certainty of Alzheimer's diagnosis (Low/Medium/High)\n");
    out.push_str("4. **Recommended Actions** - Next diagnostic steps");
    out
}

/// Deterministic report used when the language-model service is unreachable.
pub fn render_fallback(biomarkers: &BiomarkerSet, stage: StageLabel) -> String {
    let refs = ReferenceRanges::default_v1();
    let ventricles = if biomarkers.evans_index > refs.evans_normal_max {
        "Abnormal"
    } else {
        "Normal"
    };
    let mut out = String::new();

    out.push_str("# Clinical Report (Local Analysis)\n\n");
    out.push_str("**Key Findings:**\n");
    let _ = writeln!(out, "- Cognitive Stage: {}", stage.label());
    let _ = writeln!(
        out,
        "- Hippocampal Volume: {:.1} (L) / {:.1} (R) mm³",
        biomarkers.left_hippocampus, biomarkers.right_hippocampus
    );
    let _ = writeln!(out, "- Hemispheric Asymmetry: {:.2}", biomarkers.asymmetry_index);
    let _ = writeln!(out, "- Ventricular Enlargement: {ventricles}");
    let _ = writeln!(
        out,
        "- Cortical Thickness: {} mm",
        format_thickness(biomarkers.average_cortical_thickness)
    );
    out.push('\n');

    out.push_str("**Recommendations:**\n");
    for (idx, item) in RECOMMENDATIONS.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, item);
    }
    out
}

fn format_thickness(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("{v:.2}"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
