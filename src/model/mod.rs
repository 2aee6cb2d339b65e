pub mod biomarkers;
pub mod scores;
pub mod stage;
pub mod thresholds;
