use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const ENV_PREFIX: &str = "KIRA_NEURO_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub segmentation: SegmentationConfig,
    pub narrative: NarrativeConfig,
    /// Preview image location relative to the subject output directory.
    pub preview_relpath: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub docker_bin: String,
    pub image: String,
    pub gpu: bool,
    pub parallel: bool,
    pub seg_only: bool,
    pub data_mount: String,
    pub output_mount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            segmentation: SegmentationConfig::default(),
            narrative: NarrativeConfig::default(),
            preview_relpath: PathBuf::from("qc/segmentation_preview.png"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("/output"),
            data_dir: PathBuf::from("/data"),
            upload_dir: PathBuf::from("/data/uploads"),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            docker_bin: "docker".to_string(),
            image: "deepmi/fastsurfer:cu124-v2.3.3".to_string(),
            gpu: true,
            parallel: true,
            seg_only: true,
            data_mount: "/data".to_string(),
            output_mount: "/output".to_string(),
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.5,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl StorageConfig {
    pub fn subject_dir(&self, subject_id: &str) -> PathBuf {
        self.output_dir.join(subject_id)
    }

    pub fn stats_dir(&self, subject_id: &str) -> PathBuf {
        self.subject_dir(subject_id).join("stats")
    }
}

impl Config {
    /// Reads the optional JSON file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_json::from_str::<Config>(&text).map_err(|e| {
                    AppError::Config(format!("cannot parse {}: {e}", path.display()))
                })?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(v);
        }
        if let Some(v) = var("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(v);
        }
        if let Some(v) = var("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = var("GPU") {
            self.segmentation.gpu = parse_bool("GPU", &v)?;
        }
        if let Some(v) = var("SEGMENTATION_IMAGE") {
            self.segmentation.image = v;
        }
        if let Some(v) = var("LLM_ENDPOINT") {
            self.narrative.endpoint = v;
        }
        if let Some(v) = var("LLM_MODEL") {
            self.narrative.model = v;
        }
        if let Some(v) = var("LLM_TIMEOUT_SECS") {
            self.narrative.timeout_secs = v.parse().map_err(|_| {
                AppError::Config(format!("{ENV_PREFIX}LLM_TIMEOUT_SECS is not an integer: {v}"))
            })?;
        }
        if self.narrative.api_key.is_none() {
            self.narrative.api_key = lookup(&self.narrative.api_key_env).filter(|k| !k.is_empty());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.segmentation.image.trim().is_empty() {
            return Err(AppError::Config("segmentation.image is empty".to_string()));
        }
        if self.preview_relpath.is_absolute() {
            return Err(AppError::Config(
                "preview_relpath must be relative to the subject directory".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.narrative.temperature) {
            return Err(AppError::Config(format!(
                "narrative.temperature must be within 0-2 (got {})",
                self.narrative.temperature
            )));
        }
        if self.narrative.max_tokens == 0 {
            return Err(AppError::Config(
                "narrative.max_tokens must be positive".to_string(),
            ));
        }
        if self.narrative.timeout_secs == 0 {
            return Err(AppError::Config(
                "narrative.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn preview_path(&self, subject_id: &str) -> PathBuf {
        self.storage
            .subject_dir(subject_id)
            .join(&self.preview_relpath)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "{ENV_PREFIX}{name} must be a boolean (got {value})"
        ))),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
