use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub collection: CollectionSettings,
    pub llm: LlmSettings,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub users: String,
    pub hackathons: String,
    pub teams: String,
    pub requests: String,
    pub messages: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubSettings {
    #[serde(default = "default_github_endpoint")]
    pub endpoint: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            endpoint: default_github_endpoint(),
        }
    }
}

fn default_github_endpoint() -> String {
    "https://api.github.com".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Concurrency cap for batch scoring fan-out
    #[serde(default = "default_score_concurrency")]
    pub score_concurrency: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            score_concurrency: default_score_concurrency(),
        }
    }
}

fn default_score_concurrency() -> usize {
    4
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HACKMATE__),
    ///    e.g. HACKMATE__SERVER__PORT -> server.port
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("HACKMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HACKMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment overrides for secrets
///
/// Deployment platforms expose these as flat variables; checking them here
/// keeps the config files free of credentials.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let store_api_key = env::var("HACKMATE__STORE__API_KEY")
        .or_else(|_| env::var("STORE_API_KEY"))
        .ok();
    let llm_api_key = env::var("HACKMATE__LLM__API_KEY")
        .or_else(|_| env::var("GEMINI_API_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = store_api_key {
        builder = builder.set_override("store.api_key", api_key)?;
    }
    if let Some(api_key) = llm_api_key {
        builder = builder.set_override("llm.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_llm_timeout() {
        assert_eq!(default_llm_timeout(), 30);
    }

    #[test]
    fn test_default_matching_settings() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.score_concurrency, 4);
    }

    #[test]
    fn test_default_github_endpoint() {
        let github = GithubSettings::default();
        assert_eq!(github.endpoint, "https://api.github.com");
    }
}
