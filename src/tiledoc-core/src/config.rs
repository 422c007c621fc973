use serde::{Deserialize, Serialize};
use std::fmt;

pub const ENV_BASE_URL: &str = "TILEDOC_BASE_URL";
pub const ENV_USER: &str = "TILEDOC_USER";
pub const ENV_PASSWORD: &str = "TILEDOC_PASSWORD";

// Names used by the older pipeline scripts, still honoured as fallbacks.
pub const LEGACY_ENV_USER: &str = "AJDUSER";
pub const LEGACY_ENV_PASSWORD: &str = "AJDPASS";

#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Store root, e.g. `https://<host>/ords`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,

    /// Page size requested from the store; the store's own default when unset
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Per-request timeout; the HTTP client default when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080/ords".to_string()
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path, base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Build a configuration from the environment alone
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Replace fields with any values present in the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(base_url) = env_var(&[ENV_BASE_URL]) {
            self.base_url = base_url;
        }
        if let Some(user) = env_var(&[ENV_USER, LEGACY_ENV_USER]) {
            self.user = user;
        }
        if let Some(password) = env_var(&[ENV_PASSWORD, LEGACY_ENV_PASSWORD]) {
            self.password = password;
        }
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }

    /// `<base>/<user>/soda/latest`
    pub fn soda_root(&self) -> String {
        format!(
            "{}/{}/soda/latest",
            self.base_url.trim_end_matches('/'),
            self.user
        )
    }

    /// `<base>/<user>/soda/latest/<collection>`
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.soda_root(), collection)
    }
}

fn env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user: String::new(),
            password: String::new(),
            page_limit: None,
            timeout_secs: None,
            insecure_skip_verify: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("page_limit", &self.page_limit)
            .field("timeout_secs", &self.timeout_secs)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}
