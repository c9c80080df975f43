//! Configuration management for the newsdesk CLI.
//!
//! Configuration is stored in ~/.newsdesk/{app_name}/config.yaml and holds
//! named contexts, similar to kubectl's context management.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".newsdesk";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Name of the currently active context.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// Map of context name to context configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub contexts: HashMap<String, Context>,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// Provider settings for one environment (dev, prod, ...).
///
/// Empty fields fall back to environment variables and Key Vault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    /// Context name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Azure OpenAI resource endpoint.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Azure OpenAI API version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    /// Azure OpenAI resource key. Entra ID is used when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Key Vault URL for secret lookups.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyvault_url: String,

    /// Content Safety resource endpoint.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_safety_endpoint: String,

    /// Embedding deployment name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub embedding_model: String,

    /// Embedding dimensionality.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub dimensions: usize,

    /// Request timeout in seconds (optional).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Adds a new context.
    pub fn add_context(&mut self, name: &str, mut ctx: Context) -> anyhow::Result<()> {
        ctx.name = name.to_string();
        self.contexts.insert(name.to_string(), ctx);
        self.save()
    }

    /// Deletes a context.
    pub fn delete_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.contexts.remove(name);
        if self.current_context == name {
            self.current_context.clear();
        }
        self.save()
    }

    /// Sets the current context.
    pub fn use_context(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.contexts.contains_key(name) {
            anyhow::bail!("context '{}' not found", name);
        }
        self.current_context = name.to_string();
        self.save()
    }

    /// Gets a specific context.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.get(name)
    }

    /// Gets the current context.
    pub fn get_current_context(&self) -> Option<&Context> {
        if self.current_context.is_empty() {
            return None;
        }
        self.contexts.get(&self.current_context)
    }

    /// Resolves the context by name, or current context if name is empty.
    pub fn resolve_context(&self, name: Option<&str>) -> Option<&Context> {
        match name {
            Some(n) if !n.is_empty() => self.get_context(n),
            _ => self.get_current_context(),
        }
    }

    /// Lists all context names, sorted.
    pub fn list_contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.contexts.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Loads configuration for the specified app, creating an empty file on
/// first use.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        serde_yaml::from_str(&content)?
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

/// Masks the API key for display.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let n = chars.len();
    if n <= 8 {
        "*".repeat(n)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[n - 4..].iter().collect();
        format!("{}{}{}", head, "*".repeat(n - 8), tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let cfg = load_config("newsdesk", path.to_str()).unwrap();
        (dir, cfg)
    }

    #[test]
    fn load_creates_empty_config() {
        let (_dir, cfg) = temp_config();
        assert!(cfg.path().exists());
        assert!(cfg.contexts.is_empty());
        assert_eq!(cfg.app_name, "newsdesk");
    }

    #[test]
    fn contexts_round_trip_through_disk() {
        let (_dir, mut cfg) = temp_config();
        let ctx = Context {
            endpoint: "https://news.openai.azure.com".into(),
            embedding_model: "text-embedding-3-large".into(),
            dimensions: 1024,
            ..Default::default()
        };
        cfg.add_context("prod", ctx).unwrap();
        cfg.use_context("prod").unwrap();

        let path = cfg.path().to_str().unwrap().to_string();
        let reloaded = load_config("newsdesk", Some(&path)).unwrap();
        let current = reloaded.get_current_context().unwrap();
        assert_eq!(current.name, "prod");
        assert_eq!(current.dimensions, 1024);
        assert_eq!(current.endpoint, "https://news.openai.azure.com");
    }

    #[test]
    fn deleting_current_context_clears_it() {
        let (_dir, mut cfg) = temp_config();
        cfg.add_context("dev", Context::default()).unwrap();
        cfg.use_context("dev").unwrap();
        cfg.delete_context("dev").unwrap();
        assert!(cfg.current_context.is_empty());
        assert!(cfg.delete_context("dev").is_err());
    }

    #[test]
    fn resolve_prefers_named_context() {
        let (_dir, mut cfg) = temp_config();
        cfg.add_context("a", Context::default()).unwrap();
        cfg.add_context("b", Context::default()).unwrap();
        cfg.use_context("a").unwrap();
        assert_eq!(cfg.resolve_context(Some("b")).unwrap().name, "b");
        assert_eq!(cfg.resolve_context(None).unwrap().name, "a");
        assert_eq!(cfg.list_contexts(), vec!["a", "b"]);
    }

    #[test]
    fn mask_keeps_edges() {
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("abcd12345678wxyz"), "abcd********wxyz");
    }

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask_api_key("nøkkel-æøå"), "nøkk**-æøå");
        assert_eq!(mask_api_key("ææææææææ"), "********");
    }
}
