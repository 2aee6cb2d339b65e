use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "kira-neuroreport",
    version,
    about = "MRI biomarkers, cognitive staging and clinical report rendering"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "JSON configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Override storage.output_dir")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Override storage.data_dir")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Override storage.upload_dir")]
    pub upload_dir: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false, help = "Run segmentation without --gpus")]
    pub no_gpu: bool,

    #[arg(long, global = true, default_value = "info", help = "Default log filter when RUST_LOG is unset")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate and stage an uploaded scan for segmentation.
    Ingest(IngestArgs),
    /// Run the segmentation container for an ingested subject.
    Segment(SegmentArgs),
    /// Extract biomarkers, classify and render the report for a segmented subject.
    Analyze(AnalyzeArgs),
    /// Ingest, segment and analyze one scan.
    Run(RunArgs),
    /// Classify a stage from cognitive scores only.
    Classify(ScoreArgs),
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    #[arg(long, help = "Scan file (.nii or .nii.gz)")]
    pub input: PathBuf,

    #[arg(long, help = "Client filename, when it differs from the input path")]
    pub filename: Option<String>,

    #[arg(long, help = "Subject id (generated when omitted)")]
    pub subject: Option<String>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub upload: UploadArgs,
}

#[derive(Debug, Args)]
pub struct SegmentArgs {
    #[arg(long)]
    pub subject: String,

    #[arg(long, default_value_t = false, help = "Print the container command without running it")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct ScoreArgs {
    #[arg(long, allow_hyphen_values = true, help = "MMSE (0-30)")]
    pub mmse: i32,

    #[arg(long, allow_hyphen_values = true, help = "CDR (0-3)")]
    pub cdr: f64,

    #[arg(long, allow_hyphen_values = true, help = "ADAS-Cog (0-85)")]
    pub adas: f64,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(long, help = "Write the JSON response here instead of stdout")]
    pub out: Option<PathBuf>,

    #[arg(long, help = "Also write the rendered PDF to this path")]
    pub pdf: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Skip the language-model call and use the local report")]
    pub offline: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub subject: String,

    #[command(flatten)]
    pub scores: ScoreArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub upload: UploadArgs,

    #[command(flatten)]
    pub scores: ScoreArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}
