use crate::error::Result;
use crate::model::scores::CognitiveScores;
use crate::model::stage::StageLabel;
use crate::model::thresholds::ClassifierThresholds;

/// Validates the three scores and returns the stage label.
pub fn classify(mmse: i32, cdr: f64, adas: f64) -> Result<StageLabel> {
    let thresholds = ClassifierThresholds::default_v1();
    let scores = CognitiveScores::with_thresholds(mmse, cdr, adas, &thresholds)?;
    Ok(classify_scores(&scores, &thresholds))
}

/// First matching rule wins. ADAS-Cog only participates in the Alzheimer's
/// rule, so on its own it can never select MCI or Normal.
pub fn classify_scores(scores: &CognitiveScores, t: &ClassifierThresholds) -> StageLabel {
    let CognitiveScores { mmse, cdr, adas } = *scores;

    if cdr >= t.ad_cdr_min || mmse < t.ad_mmse_below || adas > t.ad_adas_above {
        return StageLabel::Alzheimers;
    }

    if (cdr >= t.mci_cdr_min && cdr < t.ad_cdr_min)
        || (mmse >= t.mci_mmse_min && mmse < t.normal_mmse_min)
    {
        return StageLabel::Mci;
    }

    if cdr == 0.0 && mmse >= t.normal_mmse_min {
        return StageLabel::Normal;
    }

    StageLabel::Uncertain
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_classify.rs"]
mod tests;
