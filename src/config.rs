//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. Configuration is sparse:
//! stock defaults cover everything, and a user config file only needs to
//! name the values it overrides.
//!
//! ## Config File Location
//!
//! A single `config.toml` next to where you run the build (or passed with
//! `--config`). There is no cascading — one site, one file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [build]
//! html_ext = ".html"        # Extension for generated pages
//! pages_folder = "pages"    # Subfolder for per-movie detail pages
//! data_filename = "data.js" # Companion data file consumed by client script
//!
//! [templates]
//! dir = "templates"         # Root directory of template bundles
//! default = "dark"          # Template id used when --template is omitted
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output file naming and layout.
    pub build: BuildConfig,
    /// Template bundle resolution.
    pub templates: TemplatesConfig,
}

impl SiteConfig {
    /// Load from a `config.toml` file. A missing file yields the defaults;
    /// a present but malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.build.html_ext.starts_with('.') {
            return Err(ConfigError::Validation(
                "build.html_ext must start with '.'".into(),
            ));
        }
        if self.build.pages_folder.is_empty() {
            return Err(ConfigError::Validation(
                "build.pages_folder must not be empty".into(),
            ));
        }
        if self.build.data_filename.is_empty() {
            return Err(ConfigError::Validation(
                "build.data_filename must not be empty".into(),
            ));
        }
        if self.templates.default.is_empty() {
            return Err(ConfigError::Validation(
                "templates.default must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Output file naming and layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Extension for generated HTML files, including the leading dot.
    pub html_ext: String,
    /// Name of the subfolder holding per-movie detail pages.
    pub pages_folder: String,
    /// Name of the companion data file consumed by client script.
    pub data_filename: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            html_ext: ".html".to_string(),
            pages_folder: "pages".to_string(),
            data_filename: "data.js".to_string(),
        }
    }
}

/// Template bundle resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Root directory containing one subdirectory per template bundle.
    pub dir: String,
    /// Template id used when the command line does not name one.
    pub default: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: "templates".to_string(),
            default: "dark".to_string(),
        }
    }
}

/// A documented stock `config.toml` with all options and their defaults.
pub fn stock_config_toml() -> String {
    "\
# moviedeck site configuration.
# All options are optional - the values below are the defaults.

[build]
# Extension for generated pages, including the leading dot.
html_ext = \".html\"
# Subfolder for per-movie detail pages.
pages_folder = \"pages\"
# Companion data file consumed by client script.
data_filename = \"data.js\"

[templates]
# Root directory of template bundles (one subdirectory per template).
dir = \"templates\"
# Template id used when --template is omitted.
default = \"dark\"
"
    .to_string()
}
