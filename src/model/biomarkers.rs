use serde::{Serialize, Serializer};

pub const LEFT_HIPPOCAMPUS: &str = "Left-Hippocampus";
pub const RIGHT_HIPPOCAMPUS: &str = "Right-Hippocampus";
pub const LEFT_LATERAL_VENTRICLE: &str = "Left-Lateral-Ventricle";
pub const RIGHT_LATERAL_VENTRICLE: &str = "Right-Lateral-Ventricle";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BiomarkerSet {
    #[serde(rename = "Left Hippocampus", serialize_with = "round2")]
    pub left_hippocampus: f64,
    #[serde(rename = "Right Hippocampus", serialize_with = "round2")]
    pub right_hippocampus: f64,
    #[serde(rename = "Asymmetry Index", serialize_with = "round2")]
    pub asymmetry_index: f64,
    #[serde(rename = "Evans Index", serialize_with = "round2")]
    pub evans_index: f64,
    #[serde(rename = "Average Cortical Thickness", serialize_with = "round2_opt")]
    pub average_cortical_thickness: Option<f64>,
}

impl BiomarkerSet {
    pub fn from_volumes(
        left_hippocampus: f64,
        right_hippocampus: f64,
        left_ventricle: f64,
        right_ventricle: f64,
        thickness: &[f64],
    ) -> Self {
        let asymmetry_index = safe_divide(
            (left_hippocampus - right_hippocampus).abs(),
            left_hippocampus.max(right_hippocampus),
        );
        let evans_index = safe_divide(
            left_ventricle + right_ventricle,
            left_hippocampus + right_hippocampus,
        );
        let average_cortical_thickness = if thickness.is_empty() {
            None
        } else {
            Some(round_to(
                thickness.iter().sum::<f64>() / thickness.len() as f64,
                2,
            ))
        };
        Self {
            left_hippocampus,
            right_hippocampus,
            asymmetry_index,
            evans_index,
            average_cortical_thickness,
        }
    }
}

/// Ratio rounded to 2 decimals; a zero denominator yields 0.0.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = round_to(numerator / denominator, 2);
    if ratio.is_finite() { ratio } else { 0.0 }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

fn round2_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(round_to(*v, 2)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/biomarkers.rs"]
mod tests;
