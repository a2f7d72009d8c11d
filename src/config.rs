use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".pr-reviewer.toml";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1200;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

const REQUIRED_ENV: [&str; 4] = [
    "GITHUB_TOKEN",
    "ANTHROPIC_API_KEY",
    "GITHUB_REPOSITORY",
    "GITHUB_EVENT_PATH",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("Invalid repository {0:?}: expected owner/name")]
    InvalidRepository(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn parse(slug: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepository(slug.to_string());
        let (owner, name) = slug.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Optional tuning read from `.pr-reviewer.toml`.
/// Every field is optional; the tool runs with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub model: ModelSettings,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub diff: DiffSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model identifier sent with every request
    pub name: String,
    /// Output token budget
    pub max_tokens: u32,
    /// Sampling temperature, kept low for repeatable reviews
    pub temperature: f32,
    /// Messages API base URL
    pub base_url: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubSettings {
    /// REST API base. Falls back to GITHUB_API_URL, then api.github.com.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiffSettings {
    /// Upper bound on diff bytes embedded in the prompt. None embeds verbatim.
    pub max_bytes: Option<usize>,
}

/// Everything a run needs, validated before any network call.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub anthropic_api_key: String,
    pub repository: Repository,
    pub event_path: PathBuf,
    pub github_api_url: String,
    pub settings: Settings,
}

impl Config {
    /// Load from the process environment plus an optional TOML file.
    ///
    /// An explicit `config_path` must exist; otherwise `.pr-reviewer.toml`
    /// in the current directory is used when present.
    pub fn load(config_path: Option<&Path>) -> Result<Config, ConfigError> {
        let settings = match config_path {
            Some(path) => Settings::load_from(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Settings::load_from(path)?
                } else {
                    Settings::default()
                }
            }
        };
        Self::from_lookup(|name| std::env::var(name).ok(), settings)
    }

    /// Build from an arbitrary variable lookup (useful for testing).
    ///
    /// All missing variables are reported together. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F, settings: Settings) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(REQUIRED_ENV.len());
        let mut missing = Vec::new();
        for name in REQUIRED_ENV {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(value) => values.push(value),
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let [github_token, anthropic_api_key, repository, event_path]: [String; 4] = values
            .try_into()
            .map_err(|_| ConfigError::Invalid("environment lookup mismatch".to_string()))?;

        settings.validate()?;

        let github_api_url = settings
            .github
            .api_url
            .clone()
            .or_else(|| lookup("GITHUB_API_URL").filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        Ok(Config {
            github_token,
            anthropic_api_key,
            repository: Repository::parse(&repository)?,
            event_path: PathBuf::from(event_path),
            github_api_url: github_api_url.trim_end_matches('/').to_string(),
            settings,
        })
    }
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.max_tokens == 0 {
            return Err(ConfigError::Invalid("model.max_tokens must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid(format!(
                "model.temperature must be within 0.0..=1.0, got {}",
                self.model.temperature
            )));
        }
        if self.diff.max_bytes == Some(0) {
            return Err(ConfigError::Invalid("diff.max_bytes must be positive".to_string()));
        }
        Ok(())
    }
}
