use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Per-attempt request timeout. A timed-out attempt is retried like
    /// any other failed attempt.
    pub timeout_seconds: u64,
    /// Maximum attempts per segment before the pipeline gives up.
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmProvider {
    OpenAI,
    Ollama,
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Segment size bound, in whitespace-delimited words.
    pub max_words_per_segment: usize,
    /// How long a cached verdict stays valid.
    pub cache_expiration_secs: u64,
    /// Cache capacity; the oldest entry is evicted once this is reached.
    pub cache_max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::OpenAI,
                api_key: None,
                base_url: None,
                model: "gpt-4".to_string(),
                max_tokens: 500,
                temperature: 0.1,
                timeout_seconds: 60,
                max_attempts: 3,
            },
            analysis: AnalysisConfig {
                max_words_per_segment: 2000,
                cache_expiration_secs: 24 * 60 * 60,
                cache_max_entries: 256,
            },
        }
    }
}

impl Config {
    /// Get the default config file path (~/.fineprint.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".fineprint.toml"))
    }

    /// Load config from file, falling back to defaults if file doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;

        let mut config = if config_path.exists() {
            println!("📝 Loading configuration from: {}", config_path.display());
            Self::from_file(&config_path)?
        } else {
            println!("ℹ️  No config file found at {}, using defaults", config_path.display());
            println!("💡 Run 'fineprint config' to create a default configuration file");
            Self::default()
        };

        // Override API key from environment variables if not set in config
        if config.llm.api_key.is_none() {
            config.llm.api_key = match config.llm.provider {
                LlmProvider::OpenAI => env::var("OPENAI_API_KEY").ok(),
                LlmProvider::Anthropic => env::var("ANTHROPIC_API_KEY").ok(),
                LlmProvider::Ollama => None, // Ollama typically doesn't need API keys
            };
        }

        Ok(config)
    }

    /// Load config from a specific file path
    pub fn from_file(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &PathBuf) -> crate::Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save_default(&self) -> crate::Result<()> {
        let config_path = Self::default_config_path()?;
        self.to_file(&config_path)
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# Fineprint Configuration File
# This file configures how fineprint analyzes terms-of-service documents

[llm]
# LLM Provider: "OpenAI", "Ollama", or "Anthropic"
provider = "OpenAI"

# API key for the provider (can also be set via environment variables)
# OpenAI: OPENAI_API_KEY
# Anthropic: ANTHROPIC_API_KEY
# api_key = "your-api-key-here"

# Base URL (mainly for Ollama local instances)
# base_url = "http://localhost:11434"

# Model to use
model = "gpt-4"

# Maximum tokens for each per-chunk finding
max_tokens = 500

# Temperature for LLM responses (0.0 = deterministic, 1.0 = creative)
temperature = 0.1

# Per-attempt request timeout in seconds
timeout_seconds = 60

# Attempts per document chunk before the analysis is aborted
max_attempts = 3

[analysis]
# Chunk size bound in words; chunks never split a word
max_words_per_segment = 2000

# How long a cached analysis stays valid (default: 24 hours)
cache_expiration_secs = 86400

# Maximum number of cached analyses kept in memory
cache_max_entries = 256
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.llm.max_attempts, 3);
        assert_eq!(config.analysis.max_words_per_segment, 2000);
        assert_eq!(config.analysis.cache_expiration_secs, 86400);
    }

    #[test]
    fn config_round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fineprint.toml");

        let mut config = Config::default();
        config.llm.model = "llama3".to_string();
        config.analysis.max_words_per_segment = 500;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.llm.model, "llama3");
        assert_eq!(loaded.analysis.max_words_per_segment, 500);
    }

    #[test]
    fn documented_config_parses() {
        let config: Config = toml::from_str(&Config::create_documented_config()).unwrap();
        assert_eq!(config.analysis.cache_max_entries, 256);
    }
}
