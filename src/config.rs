use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::openai::DEFAULT_BASE_URL;
use crate::gateway::GenerationParams;
use crate::history::DEFAULT_MAX_CHARS;
use crate::personality::extract::{OnMissing, TraitExtractor};
use crate::personality::{ManualEntry, PersonalityRecord, TraitDefaults};
use crate::roster::Roster;

/// Main npctalk configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub backend: BackendConfig,
    pub extraction: ExtractionConfig,
    pub history: HistoryConfig,
    pub manual_entry: ManualEntry,
    pub world: WorldConfig,
    pub npcs: IndexMap<String, PersonalityRecord>,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Text-completion backend settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible server
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Environment variable holding the API key (optional)
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout; 0 disables it
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// `default` fills missing traits, `fail` rejects the response
    pub on_missing: OnMissing,
    pub defaults: TraitDefaults,
    /// Profile generations to try before giving up (strict mode)
    pub profile_attempts: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Characters of history included in each dialogue prompt
    pub max_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    pub description: String,
    pub role: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            backend: BackendConfig::default(),
            extraction: ExtractionConfig::default(),
            history: HistoryConfig::default(),
            manual_entry: ManualEntry::default(),
            world: WorldConfig::default(),
            npcs: Roster::builtin(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "llama3.2".to_string(),
            api_key_env: "NPCTALK_API_KEY".to_string(),
            max_tokens: 256,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            on_missing: OnMissing::default(),
            defaults: TraitDefaults::default(),
            profile_attempts: 2,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            description: "A medieval fantasy world with kingdoms and magic.".to_string(),
            role: "Village healer".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        Self::load_first(&Self::candidate_paths())
    }

    /// Discovered config locations, in lookup order
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(env_path) = std::env::var("NPCTALK_CONFIG") {
            paths.push(PathBuf::from(env_path));
        }
        if let Ok(dir) = std::env::var("NPCTALK_DIR") {
            paths.push(PathBuf::from(dir).join("npctalk.yaml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("npctalk").join("npctalk.yaml"));
        }
        // ./npctalk.yaml (for development)
        paths.push(PathBuf::from("npctalk.yaml"));
        paths
    }

    /// Load the first existing file; a file that exists but fails to load is an error
    fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        if let Some(path) = candidates.iter().find(|p| p.exists()) {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding npctalk.yaml and the optional .env file
    pub fn npctalk_dir() -> PathBuf {
        std::env::var("NPCTALK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("npctalk"))
    }

    pub fn roster(&self) -> Roster {
        Roster::new(self.npcs.clone())
    }

    /// Extractor honoring the configured policy, or `fail` when `strict`
    pub fn extractor(&self, strict: bool) -> TraitExtractor {
        let policy = if strict { OnMissing::Fail } else { self.extraction.on_missing };
        TraitExtractor::new(policy, self.extraction.defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personality::Trait;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.max_chars, 2000);
        assert_eq!(config.extraction.on_missing, OnMissing::Default);
        assert_eq!(config.manual_entry, ManualEntry::Clamp);
        assert_eq!(config.npcs.len(), 2);
        assert!(config.npcs.contains_key("blacksmith"));
    }

    #[test]
    fn test_generation_params_from_backend() {
        let mut backend = BackendConfig::default();
        let params = backend.generation_params();
        assert_eq!(params.model, "llama3.2");
        assert_eq!(params.timeout, Some(Duration::from_secs(60)));

        backend.timeout_secs = 0;
        assert_eq!(backend.generation_params().timeout, None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
backend:
  model: mistral
extraction:
  on_missing: fail
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("Failed to parse");
        assert_eq!(config.backend.model, "mistral");
        assert_eq!(config.backend.max_tokens, 256);
        assert_eq!(config.extraction.on_missing, OnMissing::Fail);
        assert_eq!(config.extraction.profile_attempts, 2);
        assert_eq!(config.npcs.len(), 2);
    }

    #[test]
    fn test_roster_from_yaml_clamps_and_keeps_order() {
        let yaml = r#"
npcs:
  innkeeper: { openness: 55, conscientiousness: 65, agreeableness: 90, neuroticism: 20, extraversion: 140 }
  guard: { openness: 10, conscientiousness: 95, agreeableness: 30, neuroticism: 35, extraversion: 25 }
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("Failed to parse");
        let roster = config.roster();
        assert_eq!(roster.names(), vec!["innkeeper", "guard"]);
        assert_eq!(roster.get("innkeeper").unwrap().record.get(Trait::Extraversion), 100);
    }

    #[test]
    fn test_extractor_strict_override() {
        let config = Config::default();
        assert_eq!(config.extractor(false).policy(), OnMissing::Default);
        assert_eq!(config.extractor(true).policy(), OnMissing::Fail);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("npctalk.yaml");
        fs::write(&path, "log_level: debug\nhistory:\n  max_chars: 500\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.history.max_chars, 500);
    }

    #[test]
    fn test_load_first_uses_first_existing_candidate() {
        let temp = TempDir::new().unwrap();
        let absent = temp.path().join("absent.yaml");
        let present = temp.path().join("npctalk.yaml");
        fs::write(&present, "history:\n  max_chars: 300\n").unwrap();

        let config = Config::load_first(&[absent, present]).unwrap();
        assert_eq!(config.history.max_chars, 300);
    }

    #[test]
    fn test_load_first_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("npctalk.yaml");
        fs::write(&path, "extraction:\n  on_missing: fial\n").unwrap();
        let fallback = temp.path().join("other.yaml");
        fs::write(&fallback, "{}\n").unwrap();

        let err = Config::load_first(&[path.clone(), fallback]).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_load_first_without_files_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_first(&[temp.path().join("absent.yaml")]).unwrap();
        assert_eq!(config.history.max_chars, 2000);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.backend.base_url, config.backend.base_url);
        assert_eq!(parsed.npcs, config.npcs);
    }
}
