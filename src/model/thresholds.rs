#[derive(Debug, Clone)]
pub struct ClassifierThresholds {
    pub mmse_min: i32,
    pub mmse_max: i32,
    pub cdr_min: f64,
    pub cdr_max: f64,
    pub adas_min: f64,
    pub adas_max: f64,
    pub ad_cdr_min: f64,
    pub ad_mmse_below: i32,
    pub ad_adas_above: f64,
    pub mci_cdr_min: f64,
    pub mci_mmse_min: i32,
    pub normal_mmse_min: i32,
}

/// Reference ranges quoted in narrative text. Not used for staging.
#[derive(Debug, Clone)]
pub struct ReferenceRanges {
    pub mmse_normal: &'static str,
    pub cdr_normal: &'static str,
    pub adas_normal: &'static str,
    pub asymmetry_normal_max: f64,
    pub evans_normal_max: f64,
}

impl ClassifierThresholds {
    pub fn default_v1() -> Self {
        Self {
            mmse_min: 0,
            mmse_max: 30,
            cdr_min: 0.0,
            cdr_max: 3.0,
            adas_min: 0.0,
            adas_max: 85.0,
            ad_cdr_min: 1.0,
            ad_mmse_below: 21,
            ad_adas_above: 35.0,
            mci_cdr_min: 0.5,
            mci_mmse_min: 21,
            normal_mmse_min: 26,
        }
    }
}

impl ReferenceRanges {
    pub fn default_v1() -> Self {
        Self {
            mmse_normal: "27-30",
            cdr_normal: "0",
            adas_normal: "0-10",
            asymmetry_normal_max: 0.2,
            evans_normal_max: 0.3,
        }
    }
}
