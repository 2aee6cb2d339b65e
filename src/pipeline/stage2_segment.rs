use std::process::Command;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::input::upload::compressed_scan_path;

const LOG_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct SegmentationInvocation {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Stage2Output {
    pub subject_id: String,
    pub log: String,
}

/// Builds the container invocation for one subject; paths inside the
/// container are resolved against the configured mount points.
pub fn build_invocation(config: &Config, subject_id: &str) -> SegmentationInvocation {
    let seg = &config.segmentation;
    let storage = &config.storage;
    let scan_name = format!("{subject_id}_T1w.nii.gz");
    let container_scan = format!("{}/{}", seg.output_mount.trim_end_matches('/'), scan_name);

    let mut args = vec!["run".to_string(), "--rm".to_string()];
    if seg.gpu {
        args.push("--gpus".to_string());
        args.push("all".to_string());
    }
    args.push("-v".to_string());
    args.push(format!("{}:{}", storage.data_dir.display(), seg.data_mount));
    args.push("-v".to_string());
    args.push(format!("{}:{}", storage.output_dir.display(), seg.output_mount));
    args.push(seg.image.clone());
    args.push("--t1".to_string());
    args.push(container_scan);
    args.push("--sid".to_string());
    args.push(subject_id.to_string());
    args.push("--sd".to_string());
    args.push(seg.output_mount.clone());
    if seg.parallel {
        args.push("--parallel".to_string());
    }
    if seg.seg_only {
        args.push("--seg_only".to_string());
    }

    SegmentationInvocation {
        program: seg.docker_bin.clone(),
        args,
    }
}

pub fn run_stage2(config: &Config, subject_id: &str) -> Result<Stage2Output> {
    let scan = compressed_scan_path(&config.storage, subject_id);
    if !scan.is_file() {
        return Err(AppError::SegmentationFailed {
            status: "not started".to_string(),
            output: format!("compressed scan not found: {}", scan.display()),
        });
    }

    let invocation = build_invocation(config, subject_id);
    info!(
        subject = subject_id,
        image = %config.segmentation.image,
        gpu = config.segmentation.gpu,
        "starting segmentation"
    );

    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .output()
        .map_err(|e| AppError::SegmentationFailed {
            status: "not started".to_string(),
            output: format!("failed to launch {}: {e}", invocation.program),
        })?;

    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        warn!(subject = subject_id, status = %output.status, "segmentation failed");
        return Err(AppError::SegmentationFailed {
            status: output.status.to_string(),
            output: log,
        });
    }

    info!(
        subject = subject_id,
        log_excerpt = %excerpt(&log, LOG_EXCERPT_CHARS),
        "segmentation finished"
    );
    Ok(Stage2Output {
        subject_id: subject_id.to_string(),
        log,
    })
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_segment.rs"]
mod tests;
