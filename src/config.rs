// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rolling::{DEFAULT_WINDOW_MS, DEFAULT_WINDOW_NAME};

pub const ENV_WINDOW_MS: &str = "WINDOW_MEAN_MS";
pub const ENV_CONFIG_PATH: &str = "WINDOW_MEAN_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/window_mean.toml";
pub const DEFAULT_JSON_PATH: &str = "config/window_mean.json";

fn default_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}
fn default_name() -> String {
    DEFAULT_WINDOW_NAME.to_owned()
}

/// Settings for a [`WindowedMean`](crate::WindowedMean).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Trailing window length in milliseconds. Defaults to 5 minutes.
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,
    /// Instance name, used as the `window` metric label.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            name: default_name(),
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_ms <= 0 {
            bail!("window_ms must be positive, got {}", self.window_ms);
        }
        if self.name.trim().is_empty() {
            bail!("name must not be empty");
        }
        Ok(())
    }

    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading window config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse(&content, ext.as_str())
            .with_context(|| format!("parsing window config {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("invalid window config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using env vars + fallbacks:
    /// 1) $WINDOW_MEAN_MS
    /// 2) $WINDOW_MEAN_CONFIG_PATH
    /// 3) config/window_mean.toml
    /// 4) config/window_mean.json
    /// 5) built-in default
    pub fn load_default() -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_WINDOW_MS) {
            let window_ms = raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("{ENV_WINDOW_MS}={raw:?} is not an integer"))?;
            let cfg = Self {
                window_ms,
                ..Self::default()
            };
            cfg.validate()
                .with_context(|| format!("invalid {ENV_WINDOW_MS}"))?;
            return Ok(cfg);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }
}

fn parse(s: &str, hint_ext: &str) -> Result<WindowConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        // Unknown extension: JSON if it looks like an object, else TOML.
        _ if s.trim_start().starts_with('{') => Ok(serde_json::from_str(s)?),
        _ => Ok(toml::from_str(s)?),
    }
}
