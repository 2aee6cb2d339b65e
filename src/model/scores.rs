use serde::Serialize;

use crate::error::{AppError, Result};
use crate::model::thresholds::ClassifierThresholds;

/// MMSE, CDR and ADAS-Cog, range-checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CognitiveScores {
    pub mmse: i32,
    pub cdr: f64,
    pub adas: f64,
}

impl CognitiveScores {
    pub fn new(mmse: i32, cdr: f64, adas: f64) -> Result<Self> {
        Self::with_thresholds(mmse, cdr, adas, &ClassifierThresholds::default_v1())
    }

    pub fn with_thresholds(
        mmse: i32,
        cdr: f64,
        adas: f64,
        thresholds: &ClassifierThresholds,
    ) -> Result<Self> {
        if !(thresholds.mmse_min..=thresholds.mmse_max).contains(&mmse) {
            return Err(AppError::InvalidScore {
                name: "MMSE",
                min: thresholds.mmse_min as f64,
                max: thresholds.mmse_max as f64,
                value: mmse as f64,
            });
        }
        // RangeInclusive::contains is false for NaN
        if !(thresholds.cdr_min..=thresholds.cdr_max).contains(&cdr) {
            return Err(AppError::InvalidScore {
                name: "CDR",
                min: thresholds.cdr_min,
                max: thresholds.cdr_max,
                value: cdr,
            });
        }
        if !(thresholds.adas_min..=thresholds.adas_max).contains(&adas) {
            return Err(AppError::InvalidScore {
                name: "ADAS-Cog",
                min: thresholds.adas_min,
                max: thresholds.adas_max,
                value: adas,
            });
        }
        Ok(Self { mmse, cdr, adas })
    }
}
