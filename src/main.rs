mod cli;
mod config;
mod error;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::fs;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands, GlobalArgs, OutputArgs, ScoreArgs, UploadArgs};
use crate::config::Config;
use crate::error::Result;
use crate::input::upload::{IngestedScan, ingest_upload};
use crate::model::scores::CognitiveScores;
use crate::pipeline::stage2_segment::{build_invocation, run_stage2};
use crate::pipeline::stage4_classify::classify;
use crate::pipeline::stage5_narrative::{ChatCompletionClient, NarrativeClient};
use crate::pipeline::{run_analysis, timed};
use crate::report::json::{print_json, write_json};

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.global.log_level);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Ingest(args) => {
            let scan = ingest(&args.upload, &config)?;
            print_json(&scan)
        }
        Commands::Segment(args) => {
            input::upload::validate_subject_id(&args.subject)?;
            if args.dry_run {
                let invocation = build_invocation(&config, &args.subject);
                println!("{} {}", invocation.program, invocation.args.join(" "));
                return Ok(());
            }
            let out = timed("segmentation", || run_stage2(&config, &args.subject))?;
            print_json(&SegmentSummary {
                subject_id: &out.subject_id,
                stats_dir: config.storage.stats_dir(&out.subject_id).display().to_string(),
                log_tail: log_tail(&out.log, SEGMENT_LOG_TAIL_LINES),
            })
        }
        Commands::Analyze(args) => {
            let scores = validated_scores(&args.scores)?;
            analyze(&config, &args.subject, &scores, &args.output)
        }
        Commands::Run(args) => {
            let scores = validated_scores(&args.scores)?;
            let scan = ingest(&args.upload, &config)?;
            timed("segmentation", || run_stage2(&config, &scan.subject_id))?;
            analyze(&config, &scan.subject_id, &scores, &args.output)
        }
        Commands::Classify(args) => {
            let stage = classify(args.mmse, args.cdr, args.adas)?;
            print_json(&ClassifySummary {
                stage: stage.label(),
                code: stage.code(),
            })
        }
    }
}

const SEGMENT_LOG_TAIL_LINES: usize = 20;

#[derive(Debug, Serialize)]
struct SegmentSummary<'a> {
    subject_id: &'a str,
    stats_dir: String,
    log_tail: Vec<&'a str>,
}

fn log_tail(log: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = log.lines().collect();
    lines[lines.len().saturating_sub(n)..].to_vec()
}

#[derive(Debug, Serialize)]
struct ClassifySummary {
    stage: &'static str,
    code: &'static str,
}

fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = Config::load(global.config.as_deref())?;
    if let Some(dir) = &global.output_dir {
        config.storage.output_dir = dir.clone();
    }
    if let Some(dir) = &global.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(dir) = &global.upload_dir {
        config.storage.upload_dir = dir.clone();
    }
    if global.no_gpu {
        config.segmentation.gpu = false;
    }
    Ok(config)
}

fn validated_scores(args: &ScoreArgs) -> Result<CognitiveScores> {
    CognitiveScores::new(args.mmse, args.cdr, args.adas)
}

fn ingest(args: &UploadArgs, config: &Config) -> Result<IngestedScan> {
    let filename = match &args.filename {
        Some(name) => name.clone(),
        None => args.input.display().to_string(),
    };
    timed("ingest", || {
        ingest_upload(&args.input, &filename, args.subject.as_deref(), &config.storage)
    })
}

fn analyze(
    config: &Config,
    subject_id: &str,
    scores: &CognitiveScores,
    output: &OutputArgs,
) -> Result<()> {
    let client = if output.offline {
        None
    } else {
        ChatCompletionClient::from_config(&config.narrative)
    };
    let client_ref = client.as_ref().map(|c| c as &dyn NarrativeClient);

    let result = run_analysis(config, client_ref, subject_id, scores)?;

    if let Some(path) = &output.pdf {
        write_bytes(path, &result.pdf)?;
        info!(path = %path.display(), "PDF written");
    }
    match &output.out {
        Some(path) => {
            write_json(path, &result.response)?;
            info!(path = %path.display(), "response written");
            Ok(())
        }
        None => print_json(&result.response),
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
