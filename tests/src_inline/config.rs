use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.storage.output_dir, PathBuf::from("/output"));
    assert_eq!(config.segmentation.image, "deepmi/fastsurfer:cu124-v2.3.3");
    assert!(config.segmentation.gpu);
    assert_eq!(config.narrative.model, "gpt-4-turbo");
    assert_eq!(config.narrative.max_tokens, 2000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_subject_paths() {
    let config = Config::default();
    assert_eq!(
        config.storage.stats_dir("abc"),
        PathBuf::from("/output/abc/stats")
    );
    assert_eq!(
        config.preview_path("abc"),
        PathBuf::from("/output/abc/qc/segmentation_preview.png")
    );
}

#[test]
fn test_env_overrides() {
    let mut config = Config::default();
    config
        .apply_env(lookup_from(&[
            ("KIRA_NEURO_OUTPUT_DIR", "/tmp/out"),
            ("KIRA_NEURO_GPU", "false"),
            ("KIRA_NEURO_LLM_MODEL", "gpt-4o"),
            ("KIRA_NEURO_LLM_TIMEOUT_SECS", "15"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
    assert_eq!(config.storage.output_dir, PathBuf::from("/tmp/out"));
    assert!(!config.segmentation.gpu);
    assert_eq!(config.narrative.model, "gpt-4o");
    assert_eq!(config.narrative.timeout_secs, 15);
    assert_eq!(config.narrative.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn test_explicit_api_key_wins_over_env() {
    let mut config = Config::default();
    config.narrative.api_key = Some("from-file".to_string());
    config
        .apply_env(lookup_from(&[("OPENAI_API_KEY", "from-env")]))
        .unwrap();
    assert_eq!(config.narrative.api_key.as_deref(), Some("from-file"));
}

#[test]
fn test_empty_api_key_is_ignored() {
    let mut config = Config::default();
    config
        .apply_env(lookup_from(&[("OPENAI_API_KEY", "")]))
        .unwrap();
    assert!(config.narrative.api_key.is_none());
}

#[test]
fn test_invalid_env_bool() {
    let mut config = Config::default();
    let err = config
        .apply_env(lookup_from(&[("KIRA_NEURO_GPU", "maybe")]))
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_partial_json_keeps_defaults() {
    let json = r#"{ "storage": { "output_dir": "/scratch/out" }, "narrative": { "enabled": false } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.storage.output_dir, PathBuf::from("/scratch/out"));
    assert_eq!(config.storage.data_dir, PathBuf::from("/data"));
    assert!(!config.narrative.enabled);
    assert_eq!(config.narrative.temperature, 0.5);
}

#[test]
fn test_api_key_never_serialized() {
    let mut config = Config::default();
    config.narrative.api_key = Some("secret".to_string());
    let text = serde_json::to_string(&config).unwrap();
    assert!(!text.contains("secret"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = Config::default();
    config.narrative.temperature = 3.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.preview_relpath = PathBuf::from("/abs/preview.png");
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.segmentation.image = " ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file_is_config_error() {
    let err = Config::load(Some(Path::new("/nonexistent/kira-neuroreport.json"))).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
