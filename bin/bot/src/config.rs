//! Bot configuration.
//!
//! Loaded via the `config` crate from, in increasing precedence:
//!
//! 1. `config/default.toml`, if present
//! 2. the file named by `ADVISOR_CONFIG`, if set
//! 3. environment variables, `__` separating sections
//!    (`TELEGRAM__TOKEN`, `GEMINI__API_KEY`, ...)

use config::{Config, ConfigError, Environment, File};
use program_advisor_ai::{DEFAULT_PREAMBLE, GeminiConfig};
use program_advisor_conversation::QuickQuestion;
use program_advisor_knowledge::Topic;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming an extra configuration file.
pub const CONFIG_PATH_VAR: &str = "ADVISOR_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Bot configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Telegram Bot API settings.
    pub telegram: TelegramConfig,

    /// Gemini backend settings.
    pub gemini: GeminiConfig,

    /// Prompt settings.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Knowledge file settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Session housekeeping.
    #[serde(default)]
    pub session: SessionConfig,

    /// Topics offered in the menu, in display order.
    #[serde(default = "default_topics")]
    pub topics: Vec<Topic>,

    /// Quick questions, in display order.
    #[serde(default = "default_quick_questions")]
    pub quick_questions: Vec<QuickQuestion>,
}

/// Telegram Bot API settings.
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from BotFather.
    pub token: String,

    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("poll_timeout_seconds", &self.poll_timeout_seconds)
            .finish()
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_seconds() -> u64 {
    30
}

/// Prompt settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// Instruction placed before the knowledge JSON.
    #[serde(default = "default_preamble")]
    pub preamble: String,
}

fn default_preamble() -> String {
    DEFAULT_PREAMBLE.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
        }
    }
}

/// Knowledge file settings.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory relative source paths are resolved against.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Whether merged documents are cached per topic.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Whether every topic is loaded once at startup.
    #[serde(default = "default_true")]
    pub warm_up: bool,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            cache: true,
            warm_up: true,
        }
    }
}

/// Session housekeeping.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle longer than this are dropped. Unset keeps them forever.
    #[serde(default)]
    pub idle_timeout_minutes: Option<i64>,

    /// Interval between housekeeping runs, in seconds.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

fn default_sweep_interval_seconds() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: None,
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

fn default_topics() -> Vec<Topic> {
    vec![
        Topic::new("ai", "Искусственный интеллект", ["data/ai_program.json"]),
        Topic::new("product", "AI Product", ["data/ai_product.json"]),
        Topic::new(
            "both",
            "Ещё не определился",
            ["data/ai_program.json", "data/ai_product.json"],
        ),
    ]
}

fn default_quick_questions() -> Vec<QuickQuestion> {
    vec![
        QuickQuestion::new("cost", "Сколько стоит обучение?"),
        QuickQuestion::new("admission", "Можно ли поступить без профильного образования?"),
        QuickQuestion::new("scholarship", "Какие есть стипендии?"),
        QuickQuestion::new("final", "Что можно выбрать как выпускную работу?"),
    ]
}

impl BotConfig {
    /// Loads configuration from the default file, `ADVISOR_CONFIG` and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let extra = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::from_sources(extra.as_deref(), Environment::default())
    }

    /// Loads configuration from an optional extra file and `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` is given but unreadable, or if required
    /// configuration is missing or invalid.
    pub fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the session idle timeout, if configured and positive.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<chrono::Duration> {
        self.session
            .idle_timeout_minutes
            .filter(|minutes| *minutes > 0)
            .map(chrono::Duration::minutes)
    }
}
