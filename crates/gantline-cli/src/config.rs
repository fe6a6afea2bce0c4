//! Optional `gantline.toml` configuration
//!
//! Command-line flags override file values. Mail credentials are never read
//! from the file; they come from flags or the environment only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gantline_core::ColorMap;
use serde::Deserialize;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "gantline.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 1-based header row of the milestone sheet
    pub header_row: Option<usize>,
    /// Chart title
    pub title: Option<String>,
    pub smtp: SmtpConfig,
    /// Category colour overrides and additions
    pub palette: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".into(),
            port: 587,
        }
    }
}

impl Config {
    /// Load the explicit config file, or `gantline.toml` when present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        debug!(file = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Zero-based header row; the flag wins over the file
    pub fn header_row_index(&self, flag: Option<usize>) -> Result<usize> {
        match flag.or(self.header_row) {
            Some(0) => bail!("header row is 1-based; 0 is not a valid row"),
            Some(row) => Ok(row - 1),
            None => Ok(gantline_loader::DEFAULT_HEADER_ROW),
        }
    }

    /// Default palette with the configured overrides applied
    pub fn color_map(&self) -> ColorMap {
        self.palette
            .iter()
            .fold(ColorMap::default(), |map, (category, color)| {
                map.with_color(category.as_str(), color.as_str())
            })
    }
}
