use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::offline::{generation_name, RouterOptions, SqliteStorage};
use crate::site::contact::FormField;
use crate::site::{Category, Project};

/// Content used when no configuration file exists.
const BUILTIN_CONFIG: &str = include_str!("../vitrine.example.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(default)]
  pub projects: Vec<Project>,
  #[serde(default)]
  pub contact: ContactConfig,
  #[serde(default)]
  pub offline: OfflineConfig,
}

fn default_title() -> String {
  "vitrine".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactConfig {
  #[serde(default)]
  pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfflineConfig {
  /// Base URL every manifest path and fetched path is resolved against
  #[serde(default = "default_origin")]
  pub origin: String,
  /// Cache generation name is `<cache_prefix>-v<version>`
  #[serde(default = "default_cache_prefix")]
  pub cache_prefix: String,
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub manifest: Vec<String>,
  #[serde(default = "default_fallback_document")]
  pub fallback_document: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Cache database location (defaults to the user data directory)
  pub database: Option<PathBuf>,
}

fn default_origin() -> String {
  "http://localhost:8080".to_string()
}

fn default_cache_prefix() -> String {
  "vitrine".to_string()
}

fn default_version() -> u32 {
  1
}

fn default_fallback_document() -> String {
  "/index.html".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Default for OfflineConfig {
  fn default() -> Self {
    Self {
      origin: default_origin(),
      cache_prefix: default_cache_prefix(),
      version: default_version(),
      manifest: Vec::new(),
      fallback_document: default_fallback_document(),
      timeout_secs: default_timeout_secs(),
      database: None,
    }
  }
}

impl OfflineConfig {
  /// Name of the current cache generation.
  pub fn generation(&self) -> String {
    generation_name(&self.cache_prefix, self.version)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn origin_url(&self) -> Result<Url> {
    Url::parse(&self.origin).map_err(|e| eyre!("Invalid offline origin '{}': {}", self.origin, e))
  }

  pub fn router_options(&self) -> Result<RouterOptions> {
    Ok(RouterOptions {
      origin: self.origin_url()?,
      generation: self.generation(),
      manifest: self.manifest.clone(),
      fallback_document: self.fallback_document.clone(),
    })
  }

  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.database {
      Some(path) => Ok(path.clone()),
      None => SqliteStorage::default_path().ok_or_else(|| eyre!("Could not determine data directory")),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./vitrine.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/vitrine/config.yaml
  /// 4. Built-in site content
  ///
  /// `VITRINE_ORIGIN` overrides `offline.origin` in every case.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::builtin()?,
    };

    if let Ok(origin) = std::env::var("VITRINE_ORIGIN") {
      config.offline.origin = origin;
    }

    Ok(config)
  }

  /// The site content shipped with the binary.
  pub fn builtin() -> Result<Self> {
    Self::parse(BUILTIN_CONFIG).map_err(|e| eyre!("Failed to parse built-in config: {}", e))
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("vitrine.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("vitrine").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.check()?;
    Ok(config)
  }

  /// Reject content the UI cannot present sensibly.
  fn check(&self) -> Result<()> {
    for project in &self.projects {
      if !self.categories.is_empty() && !self.categories.iter().any(|c| c.id == project.category) {
        return Err(eyre!(
          "Project '{}' uses unknown category '{}'",
          project.id,
          project.category
        ));
      }
      if project.tabs.iter().filter(|t| t.default).count() > 1 {
        return Err(eyre!("Project '{}' has more than one default tab", project.id));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_config_parses() {
    let config = Config::builtin().unwrap();
    assert_eq!(config.title, "AppAnwendung");
    assert_eq!(config.projects.len(), 5);
    assert_eq!(config.offline.generation(), "appanwendung-v1");
    assert_eq!(config.offline.manifest.len(), 10);
    assert!(config.contact.fields.iter().any(|f| f.name == "email"));
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("title: Test").unwrap();
    assert!(config.projects.is_empty());
    assert_eq!(config.offline.generation(), "vitrine-v1");
    assert_eq!(config.offline.fallback_document, "/index.html");
    assert_eq!(config.offline.timeout(), Duration::from_secs(10));
  }

  #[test]
  fn test_unknown_category_rejected() {
    let yaml = r#"
categories:
  - id: web
    label: Web
projects:
  - id: a
    title: A
    category: print
"#;
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_two_default_tabs_rejected() {
    let yaml = r#"
projects:
  - id: a
    title: A
    category: web
    tabs:
      - { id: one, label: One, default: true }
      - { id: two, label: Two, default: true }
"#;
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_router_options() {
    let config = Config::builtin().unwrap();
    let options = config.offline.router_options().unwrap();
    assert_eq!(options.origin.as_str(), "http://localhost:8080/");
    assert_eq!(options.generation, "appanwendung-v1");
  }

  #[test]
  fn test_bad_origin_rejected() {
    let mut config = Config::builtin().unwrap();
    config.offline.origin = "not a url".to_string();
    assert!(config.offline.router_options().is_err());
  }
}
