//! Configuration loading for quizbank.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Data-dir config (`<data_dir>/config.toml`)
//! 3. User config (`~/.quizbank/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional; the engine runs with sensible defaults
//! when no config exists. The supported-goal list here only seeds the
//! registry on first start — after that the registry file is the
//! authority and goal mutations go through the goal manager, never
//! through this snapshot.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::model::{Difficulty, GenerationMode};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Generation defaults.
    pub generation: GenerationConfig,
    /// Pool cache bounds.
    pub cache: CacheConfig,
    /// Goal lifecycle policy.
    pub goals: GoalPolicyConfig,
    /// Supported value sets, used to seed the registry and restrict
    /// difficulty tiers.
    pub supported: SupportedConfig,
}

/// Generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Mode used when a request does not name one.
    pub default_mode: GenerationMode,
    /// Upper bound on questions per quiz.
    pub max_questions: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_mode: GenerationMode::Retrieval,
            max_questions: 10,
        }
    }
}

/// Pool cache bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached pool stays valid.
    pub ttl_secs: u64,
    /// Maximum questions retained in the cached snapshot.
    pub max_size: usize,
}

impl CacheConfig {
    /// The TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_size: 1000,
        }
    }
}

/// Goal lifecycle policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GoalPolicyConfig {
    /// Minimum total questions (existing + provided) to register a new
    /// goal.
    pub min_questions: usize,
}

impl Default for GoalPolicyConfig {
    fn default() -> Self {
        Self { min_questions: 10 }
    }
}

/// Supported value sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupportedConfig {
    /// Goals used to seed the registry when no registry file exists.
    pub goals: Vec<String>,
    /// Difficulty tiers this deployment accepts.
    pub difficulties: Vec<Difficulty>,
}

impl Default for SupportedConfig {
    fn default() -> Self {
        Self {
            goals: vec![
                "GATE AE".to_string(),
                "Amazon SDE".to_string(),
                "CAT".to_string(),
            ],
            difficulties: Difficulty::ALL.to_vec(),
        }
    }
}

/// The quizbank home directory: `$QUIZBANK_HOME` or `~/.quizbank`.
pub fn quizbank_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("QUIZBANK_HOME") {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".quizbank"))
}

/// The default data directory: `<quizbank home>/data`.
pub fn default_data_dir() -> Option<PathBuf> {
    quizbank_home().map(|home| home.join("data"))
}

impl Config {
    /// Load configuration following the precedence chain rooted at
    /// `data_dir` (when given).
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = quizbank_home().map(|home| home.join("config.toml")) {
            if path.exists() {
                config = Self::from_file(&path)?;
            }
        }
        if let Some(path) = data_dir.map(|dir| dir.join("config.toml")) {
            if path.exists() {
                config = Self::from_file(&path)?;
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| QuizError::persistence(path, e))?;
        toml::from_str(&content)
            .map_err(|e| QuizError::config(format!("invalid config at {}: {e}", path.display())))
    }

    /// Apply `QUIZBANK_*` environment overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(mode) = env::var("QUIZBANK_MODE") {
            match mode.as_str() {
                "retrieval" => self.generation.default_mode = GenerationMode::Retrieval,
                "template" => self.generation.default_mode = GenerationMode::Template,
                other => tracing::warn!(mode = other, "ignoring unknown QUIZBANK_MODE"),
            }
        }
        if let Ok(value) = env::var("QUIZBANK_CACHE_TTL_SECS") {
            match value.parse() {
                Ok(ttl) => self.cache.ttl_secs = ttl,
                Err(_) => tracing::warn!(value, "ignoring invalid QUIZBANK_CACHE_TTL_SECS"),
            }
        }
        if let Ok(value) = env::var("QUIZBANK_MIN_QUESTIONS") {
            match value.parse() {
                Ok(min) => self.goals.min_questions = min,
                Err(_) => tracing::warn!(value, "ignoring invalid QUIZBANK_MIN_QUESTIONS"),
            }
        }
        if let Ok(value) = env::var("QUIZBANK_MAX_QUESTIONS") {
            match value.parse() {
                Ok(max) => self.generation.max_questions = max,
                Err(_) => tracing::warn!(value, "ignoring invalid QUIZBANK_MAX_QUESTIONS"),
            }
        }
    }

    /// Reject configurations the engine cannot run with.
    fn validate(&self) -> Result<()> {
        if self.generation.max_questions == 0 {
            return Err(QuizError::config("generation.max_questions must be >= 1"));
        }
        if self.supported.difficulties.is_empty() {
            return Err(QuizError::config(
                "supported.difficulties must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "QUIZBANK_HOME",
            "QUIZBANK_MODE",
            "QUIZBANK_CACHE_TTL_SECS",
            "QUIZBANK_MIN_QUESTIONS",
            "QUIZBANK_MAX_QUESTIONS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::default();
        assert_eq!(config.generation.default_mode, GenerationMode::Retrieval);
        assert_eq!(config.generation.max_questions, 10);
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache.max_size, 1000);
        assert_eq!(config.goals.min_questions, 10);
        assert_eq!(config.supported.goals, ["GATE AE", "Amazon SDE", "CAT"]);
        assert_eq!(config.supported.difficulties, Difficulty::ALL);
    }

    #[test]
    #[serial]
    fn test_load_from_data_dir_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        // Point home somewhere empty so only the data-dir config applies.
        env::set_var("QUIZBANK_HOME", dir.path().join("home"));
        fs::write(
            dir.path().join("config.toml"),
            r#"
[generation]
default_mode = "template"
max_questions = 8

[goals]
min_questions = 12

[supported]
goals = ["GATE AE", "Amazon SDE"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.generation.default_mode, GenerationMode::Template);
        assert_eq!(config.generation.max_questions, 8);
        assert_eq!(config.goals.min_questions, 12);
        assert_eq!(config.supported.goals.len(), 2);
        // Unspecified sections keep defaults.
        assert_eq!(config.cache.ttl_secs, 3600);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides_win() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("QUIZBANK_HOME", dir.path().join("home"));
        env::set_var("QUIZBANK_MODE", "template");
        env::set_var("QUIZBANK_MIN_QUESTIONS", "15");

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.generation.default_mode, GenerationMode::Template);
        assert_eq!(config.goals.min_questions, 15);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("QUIZBANK_HOME", dir.path().join("home"));
        env::set_var("QUIZBANK_MODE", "telepathy");
        env::set_var("QUIZBANK_CACHE_TTL_SECS", "soon");

        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.generation.default_mode, GenerationMode::Retrieval);
        assert_eq!(config.cache.ttl_secs, 3600);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_config_rejected() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("QUIZBANK_HOME", dir.path().join("home"));
        fs::write(
            dir.path().join("config.toml"),
            "[generation]\nmax_questions = 0\n",
        )
        .unwrap();
        let err = Config::load(Some(dir.path())).unwrap_err();
        assert_eq!(err.kind(), "config");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_toml_is_a_config_error() {
        clear_env();
        let dir = TempDir::new().unwrap();
        env::set_var("QUIZBANK_HOME", dir.path().join("home"));
        fs::write(dir.path().join("config.toml"), "not = [valid").unwrap();
        let err = Config::load(Some(dir.path())).unwrap_err();
        assert_eq!(err.kind(), "config");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_quizbank_home_env_override() {
        clear_env();
        env::set_var("QUIZBANK_HOME", "/tmp/quizbank-test-home");
        assert_eq!(
            quizbank_home().unwrap(),
            PathBuf::from("/tmp/quizbank-test-home")
        );
        assert_eq!(
            default_data_dir().unwrap(),
            PathBuf::from("/tmp/quizbank-test-home/data")
        );
        clear_env();
    }
}
