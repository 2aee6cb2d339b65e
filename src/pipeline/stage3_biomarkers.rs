use std::path::Path;

use tracing::{info, warn};

use crate::input::stats::{
    HEMISPHERES, REGION_STATS_FILE, ParseAudit, open_optional, parse_region_volumes,
    parse_thickness, thickness_stats_file,
};
use crate::model::biomarkers::{
    BiomarkerSet, LEFT_HIPPOCAMPUS, LEFT_LATERAL_VENTRICLE, RIGHT_HIPPOCAMPUS,
    RIGHT_LATERAL_VENTRICLE,
};

#[derive(Debug, Clone)]
pub struct Stage3Output {
    pub biomarkers: BiomarkerSet,
    pub audit: ParseAudit,
    pub files_found: usize,
}

/// Best-effort extraction: absent or unreadable files count as no data.
pub fn run_stage3(stats_dir: &Path) -> Stage3Output {
    let mut audit = ParseAudit::default();
    let mut files_found = 0usize;

    let region_path = stats_dir.join(REGION_STATS_FILE);
    let volumes = match open_optional(&region_path).and_then(|r| match r {
        Some(reader) => parse_region_volumes(reader).map(Some),
        None => Ok(None),
    }) {
        Ok(Some((volumes, file_audit))) => {
            files_found += 1;
            audit.merge(file_audit);
            volumes
        }
        Ok(None) => {
            warn!(path = %region_path.display(), "region statistics missing; volumes default to 0");
            Default::default()
        }
        Err(err) => {
            warn!(path = %region_path.display(), error = %err, "error parsing region statistics");
            Default::default()
        }
    };

    let mut thickness = Vec::new();
    for hemi in HEMISPHERES {
        let path = stats_dir.join(thickness_stats_file(hemi));
        let parsed = open_optional(&path).and_then(|r| match r {
            Some(reader) => parse_thickness(reader).map(Some),
            None => Ok(None),
        });
        match parsed {
            Ok(Some((values, file_audit))) => {
                files_found += 1;
                audit.merge(file_audit);
                thickness.extend(values);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(hemi, path = %path.display(), error = %err, "error parsing cortical statistics");
            }
        }
    }

    if audit.rows_skipped > 0 {
        warn!(
            rows_skipped = audit.rows_skipped,
            rows_parsed = audit.rows_parsed,
            "statistics rows skipped"
        );
    }

    let region = |name: &str| volumes.get(name).copied().unwrap_or(0.0);
    let biomarkers = BiomarkerSet::from_volumes(
        region(LEFT_HIPPOCAMPUS),
        region(RIGHT_HIPPOCAMPUS),
        region(LEFT_LATERAL_VENTRICLE),
        region(RIGHT_LATERAL_VENTRICLE),
        &thickness,
    );

    info!(
        files_found,
        rows_parsed = audit.rows_parsed,
        thickness_values = thickness.len(),
        "biomarkers extracted"
    );

    Stage3Output {
        biomarkers,
        audit,
        files_found,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_biomarkers.rs"]
mod tests;
