//! Configuration loading from `~/.config/blogsync/config.yaml`.
//!
//! Loads YAML config with defaults, then applies environment variable
//! overrides. Store credentials are never compiled in: they come from the
//! file or from `BLOGSYNC_STORE_URL` / `BLOGSYNC_STORE_KEY`.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::BlogsyncError;

/// Raw YAML config structure.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    store: StoreSection,

    #[serde(default)]
    posts: PostsSection,

    #[serde(default)]
    update: UpdateSection,
}

#[derive(Debug, Deserialize)]
struct StoreSection {
    url: Option<String>,

    key: Option<String>,

    #[serde(default = "default_table")]
    table: String,

    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_table() -> String {
    "blog_posts".into()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize)]
struct PostsSection {
    #[serde(default = "default_posts_dir")]
    directory: String,

    #[serde(default = "default_extensions")]
    extensions: Vec<String>,

    #[serde(default = "default_published")]
    published: bool,
}

impl Default for PostsSection {
    fn default() -> Self {
        Self {
            directory: default_posts_dir(),
            extensions: default_extensions(),
            published: default_published(),
        }
    }
}

fn default_posts_dir() -> String {
    "blog_posts".into()
}

fn default_extensions() -> Vec<String> {
    vec![".md".into()]
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
struct UpdateSection {
    /// File name -> slug the record was originally published under.
    #[serde(default)]
    slug_map: BTreeMap<String, String>,
}

/// Connection settings for the remote content store.
#[derive(Debug)]
pub struct StoreConfig {
    pub url: String,
    pub key: SecretString,
    pub table: String,
    pub timeout_secs: u64,
}

/// Resolved application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub store_url: Option<String>,
    pub store_key: Option<SecretString>,
    pub table: String,
    pub timeout_secs: u64,
    pub posts_dir: PathBuf,
    pub extensions: Vec<String>,
    pub published: bool,
    pub slug_map: BTreeMap<String, String>,
}

impl AppConfig {
    /// Config file path (`BLOGSYNC_CONFIG` overrides the default).
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("BLOGSYNC_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("blogsync")
            .join("config.yaml")
    }

    /// Store settings, or a config error naming what is missing.
    pub fn store(&self) -> Result<StoreConfig, BlogsyncError> {
        let url = self.store_url.clone().ok_or_else(|| {
            BlogsyncError::Config(
                "store url not set (store.url in config or BLOGSYNC_STORE_URL)".into(),
            )
        })?;
        let key = self.store_key.as_ref().ok_or_else(|| {
            BlogsyncError::Config(
                "store key not set (store.key in config or BLOGSYNC_STORE_KEY)".into(),
            )
        })?;

        Ok(StoreConfig {
            url: url.trim_end_matches('/').to_string(),
            key: SecretString::from(key.expose_secret().to_owned()),
            table: self.table.clone(),
            timeout_secs: self.timeout_secs,
        })
    }

    /// Document directory: the explicit argument wins over the config.
    pub fn posts_dir_or(&self, dir: Option<PathBuf>) -> PathBuf {
        dir.unwrap_or_else(|| self.posts_dir.clone())
    }
}

/// Load configuration from the YAML file + env var overrides.
pub fn load_config() -> Result<AppConfig, BlogsyncError> {
    let config_path = AppConfig::config_path();
    let raw = read_raw_config(&config_path)?;
    Ok(resolve(raw, |name| env::var(name).ok()))
}

fn read_raw_config(config_path: &Path) -> Result<RawConfig, BlogsyncError> {
    if !config_path.exists() {
        // No config file: use defaults
        return Ok(RawConfig::default());
    }

    let text = std::fs::read_to_string(config_path).map_err(|e| {
        BlogsyncError::Config(format!("Failed to read {}: {e}", config_path.display()))
    })?;
    parse_raw_config(&text).map_err(|e| {
        BlogsyncError::Config(format!("Failed to parse {}: {e}", config_path.display()))
    })
}

fn parse_raw_config(text: &str) -> Result<RawConfig, serde_yaml::Error> {
    // An empty file deserializes as unit, not as a mapping
    if text.trim().is_empty() {
        return Ok(RawConfig::default());
    }
    serde_yaml::from_str(text)
}

/// Apply environment overrides (via `lookup`) to the file config.
fn resolve(raw: RawConfig, lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let store_url = lookup("BLOGSYNC_STORE_URL").or(raw.store.url);
    let store_key = lookup("BLOGSYNC_STORE_KEY")
        .or(raw.store.key)
        .map(SecretString::from);
    let table = lookup("BLOGSYNC_TABLE").unwrap_or(raw.store.table);
    let posts_dir = lookup("BLOGSYNC_POSTS_DIR").unwrap_or(raw.posts.directory);

    AppConfig {
        store_url,
        store_key,
        table,
        timeout_secs: raw.store.timeout_secs,
        posts_dir: PathBuf::from(posts_dir),
        extensions: raw.posts.extensions,
        published: raw.posts.published,
        slug_map: raw.update.slug_map,
    }
}
