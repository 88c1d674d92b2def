use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::issues::IssueState;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = ".issue-pii-scan.toml";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
/// Documents per analysis request; also the service's synchronous cap.
pub const MAX_BATCH_SIZE: usize = 5;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DOMAIN: &str = "phi";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid confidence score threshold {value:?}: {reason}")]
    InvalidThreshold { value: String, reason: String },

    #[error("Batch size must be between 1 and {max}, got {0}", max = MAX_BATCH_SIZE)]
    InvalidBatchSize(usize),
}

/// Raw configuration as read from the TOML file and environment.
///
/// Every field is optional here; [`Config::resolve`] enforces what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Azure AI Language resource settings
    #[serde(default)]
    pub language: LanguageConfig,

    /// Issue tracker settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageConfig {
    /// Resource endpoint. Falls back to AZ_AI_ENDPOINT.
    pub endpoint: Option<String>,
    /// Subscription key. Falls back to AZ_AI_KEY.
    pub key: Option<String>,
    pub domain: Option<String>,
    pub document_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Falls back to GITHUB_OWNER.
    pub owner: Option<String>,
    /// Falls back to GITHUB_REPO.
    pub repo: Option<String>,
    /// Falls back to GITHUB_PAT, then GITHUB_TOKEN.
    pub token: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfig {
    /// Falls back to CONFIDENCE_SCORE_THRESHOLD.
    pub confidence_threshold: Option<Threshold>,
    pub batch_size: Option<usize>,
    pub state: Option<IssueState>,
}

/// Threshold as written by the user; TOML may carry a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

impl Threshold {
    pub fn parse(&self) -> Result<f64, ConfigError> {
        let value = match self {
            Threshold::Number(value) => *value,
            Threshold::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|e| ConfigError::InvalidThreshold {
                        value: text.clone(),
                        reason: e.to_string(),
                    })?
            }
        };
        if value.is_nan() {
            return Err(ConfigError::InvalidThreshold {
                value: value.to_string(),
                reason: "not a number".to_string(),
            });
        }
        Ok(value)
    }
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: LanguageSettings,
    pub github: GitHubSettings,
    pub scan: ScanSettings,
}

#[derive(Debug, Clone)]
pub struct LanguageSettings {
    pub endpoint: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
}

/// Knobs the scan loop itself reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Minimum confidence score (inclusive) for an entity to be reported
    pub threshold: f64,
    /// Maximum documents per analysis request
    pub batch_size: usize,
    /// Language tag attached to every document
    pub language: String,
    /// Analysis domain, e.g. "phi"
    pub domain: String,
    pub state: IssueState,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, then fill unset values from the environment.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill every value the file left unset from `lookup`.
    /// Values already present win over the environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        fill(&mut self.language.endpoint, || lookup("AZ_AI_ENDPOINT"));
        fill(&mut self.language.key, || lookup("AZ_AI_KEY"));
        fill(&mut self.github.owner, || lookup("GITHUB_OWNER"));
        fill(&mut self.github.repo, || lookup("GITHUB_REPO"));
        fill(&mut self.github.token, || {
            lookup("GITHUB_PAT").or_else(|| lookup("GITHUB_TOKEN"))
        });
        fill(&mut self.scan.confidence_threshold, || {
            lookup("CONFIDENCE_SCORE_THRESHOLD").map(Threshold::Text)
        });
    }

    /// Validate and produce the settings for a run. No network activity
    /// happens before this succeeds.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let threshold = self
            .scan
            .confidence_threshold
            .as_ref()
            .ok_or(ConfigError::Missing("CONFIDENCE_SCORE_THRESHOLD"))?
            .parse()?;

        let batch_size = self.scan.batch_size.unwrap_or(MAX_BATCH_SIZE);
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }

        let language = LanguageSettings {
            endpoint: required(&self.language.endpoint, "AZ_AI_ENDPOINT")?,
            key: required(&self.language.key, "AZ_AI_KEY")?,
        };

        let github = GitHubSettings {
            api_url: self
                .github
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            token: self.github.token.clone().filter(|t| !t.is_empty()),
            owner: required(&self.github.owner, "GITHUB_OWNER")?,
            repo: required(&self.github.repo, "GITHUB_REPO")?,
        };

        let scan = ScanSettings {
            threshold,
            batch_size,
            language: self
                .language
                .document_language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            domain: self
                .language
                .domain
                .clone()
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
            state: self.scan.state.unwrap_or_default(),
        };

        Ok(Settings {
            language,
            github,
            scan,
        })
    }
}

fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> Option<T>) {
    if slot.is_none() {
        *slot = value();
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(name))
}
