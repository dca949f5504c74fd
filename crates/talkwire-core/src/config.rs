use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Samples per recognition frame handed to the worker.
    #[serde(default = "default_frame_size")]
    pub frame_size: u32,

    #[serde(default = "default_device_name")]
    pub device: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sample_rate: default_sample_rate(),
            frame_size: default_frame_size(),
            device: default_device_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Engine variant name, looked up in the engine registry.
    #[serde(default = "default_engine")]
    pub engine: String,

    /// Path or URL of the engine binary module. Empty means no module bytes.
    #[serde(default)]
    pub module: String,

    /// Path or URL of the engine data payload. Empty means no data bytes.
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub mode: CaptureMode,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            module: String::new(),
            data: String::new(),
            mode: CaptureMode::default(),
        }
    }
}

/// How audio reaches the framing pipeline. Only `Push` (callback-driven
/// capture) is implemented; `Pull` parses but is rejected at start.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    #[default]
    Push,
    Pull,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_frame_size() -> u32 {
    1024
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_engine() -> String {
    "scripted".to_string()
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.sample_rate, 16000);
        assert_eq!(config.general.frame_size, 1024);
        assert_eq!(config.general.device, "default");
        assert_eq!(config.model.engine, "scripted");
        assert_eq!(config.model.mode, CaptureMode::Push);
    }

    #[test]
    fn test_full_config_parses() {
        let toml = r#"
            [general]
            log_level = "debug"
            sample_rate = 48000
            frame_size = 512
            device = "USB Microphone"

            [model]
            engine = "sherpa-ncnn"
            module = "models/sherpa.wasm"
            data = "models/sherpa.data"
            mode = "push"
        "#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.general.sample_rate, 48000);
        assert_eq!(config.general.frame_size, 512);
        assert_eq!(config.general.device, "USB Microphone");
        assert_eq!(config.model.engine, "sherpa-ncnn");
        assert_eq!(config.model.module, "models/sherpa.wasm");
    }

    #[test]
    fn test_pull_mode_parses() {
        let toml = r#"
            [model]
            mode = "pull"
        "#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.model.mode, CaptureMode::Pull);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = AppConfig::from_toml_str("general = nonsense");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/talkwire.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
