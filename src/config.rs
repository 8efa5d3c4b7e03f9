//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fallback variable consulted when the configured one is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Keys that `set_value` clears when given an empty value.
const OPTIONAL_KEYS: [&str; 3] = ["filter.location", "filter.min_score", "output.export_path"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub max_files: usize,
    pub max_file_size_mb: u64,
    pub max_resume_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    pub location: Option<String>,
    pub min_score: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub export_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.0,
            request_timeout_secs: 60,
            max_attempts: 2,
            retry_backoff_ms: 1000,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_files: 50,
            max_file_size_mb: 10,
            max_resume_chars: 30_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
            export_path: None,
        }
    }
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Read the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

impl InputConfig {
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.ai.model.trim().is_empty() {
            return Err(ScreenerError::Configuration("ai.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ScreenerError::Configuration(format!(
                "ai.temperature must be between 0.0 and 2.0, got {}",
                self.ai.temperature
            )));
        }
        if self.ai.max_attempts == 0 {
            return Err(ScreenerError::Configuration("ai.max_attempts must be at least 1".to_string()));
        }
        if self.ai.request_timeout_secs == 0 {
            return Err(ScreenerError::Configuration(
                "ai.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.input.max_files == 0 || self.input.max_file_size_mb == 0 || self.input.max_resume_chars == 0 {
            return Err(ScreenerError::Configuration(
                "input limits must be greater than 0".to_string(),
            ));
        }
        if let Some(min_score) = self.filter.min_score {
            if min_score > 100 {
                return Err(ScreenerError::Configuration(format!(
                    "filter.min_score must be between 0 and 100, got {}",
                    min_score
                )));
            }
        }
        Ok(())
    }

    /// Set a value by dotted key, e.g. `ai.model` or `filter.min_score`.
    ///
    /// The value is read as a TOML literal when it parses as one and as a
    /// plain string otherwise. An empty value unsets an optional key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
            return Err(ScreenerError::Configuration(format!(
                "Invalid key '{}': expected <section>.<field>",
                key
            )));
        }

        let clearing = value.trim().is_empty();
        if clearing && !OPTIONAL_KEYS.contains(&key) {
            return Err(ScreenerError::Configuration(format!(
                "{} cannot be empty; use `config reset` to restore defaults",
                key
            )));
        }

        let parsed = toml::from_str::<toml::Table>(&format!("v = {}", value))
            .ok()
            .and_then(|mut table| table.remove("v"))
            .unwrap_or_else(|| toml::Value::String(value.to_string()));

        let mut root = toml::Value::try_from(&*self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        let section = root
            .get_mut(segments[0])
            .and_then(toml::Value::as_table_mut)
            .ok_or_else(|| ScreenerError::Configuration(format!("Unknown configuration section: {}", segments[0])))?;
        if clearing {
            section.remove(segments[1]);
        } else {
            section.insert(segments[1].to_string(), parsed);
        }

        let updated: Config = root
            .try_into()
            .map_err(|e| ScreenerError::Configuration(format!("Invalid value for {}: {}", key, e)))?;

        // Unknown fields are dropped by deserialization; catch them here.
        if !clearing {
            let check = toml::Value::try_from(&updated)
                .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;
            if check.get(segments[0]).and_then(|s| s.get(segments[1])).is_none() {
                return Err(ScreenerError::Configuration(format!("Unknown configuration key: {}", key)));
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.ai.max_attempts, 2);
        assert_eq!(config.output.format, OutputFormat::Console);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[filter]\nmin_score = 70\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.filter.min_score, Some(70));
        assert_eq!(config.ai.api_key_env, "GOOGLE_API_KEY");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[ai]\nmax_attempts = 0\n").unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(ScreenerError::Configuration(_))));
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("filter.min_score", "65").unwrap();
        config.set_value("filter.location", "Pune").unwrap();
        config.set_value("ai.model", "gemini-2.0-flash").unwrap();
        config.set_value("output.color_output", "false").unwrap();

        assert_eq!(config.filter.min_score, Some(65));
        assert_eq!(config.filter.location.as_deref(), Some("Pune"));
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        assert!(!config.output.color_output);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set_value("filter.min_score", "150").is_err());
        assert!(config.set_value("filter.min_score", "lots").is_err());
        assert!(config.set_value("ai.no_such_field", "1").is_err());
        assert!(config.set_value("nowhere.model", "x").is_err());
        assert!(config.set_value("model", "x").is_err());
        assert_eq!(config.filter.min_score, None);
    }

    #[test]
    fn test_set_empty_value_clears_optional_keys() {
        let mut config = Config::default();
        config.set_value("filter.min_score", "65").unwrap();
        config.set_value("filter.location", "Pune").unwrap();
        config.set_value("output.export_path", "shortlist.xlsx").unwrap();

        config.set_value("filter.min_score", "").unwrap();
        config.set_value("filter.location", " ").unwrap();
        config.set_value("output.export_path", "").unwrap();

        assert_eq!(config.filter.min_score, None);
        assert_eq!(config.filter.location, None);
        assert_eq!(config.output.export_path, None);

        assert!(config.set_value("ai.model", "").is_err());
        assert_eq!(config.ai.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_zero_resume_chars_is_rejected() {
        let mut config = Config::default();
        config.input.max_resume_chars = 0;
        assert!(matches!(config.validate(), Err(ScreenerError::Configuration(_))));
        assert!(Config::default().set_value("input.max_resume_chars", "0").is_err());
    }
}
