// =============================================================================
// CONFIGURATION - Load the shader manifest from TOML
// =============================================================================
//
// The manifest names the shaders to build (one `[[shader]]` table each) and
// carries the build, compiler and logging settings. Sections are optional
// and fall back to defaults.

use crate::batch::InputItem;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root manifest structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub compiler: CompilerConfig,
    pub logging: LoggingConfig,
    #[serde(rename = "shader")]
    pub shaders: Vec<InputItem>,
}

/// Where artifacts go and how many files compile at once
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output_path: String,
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_path: "build/".to_string(),
            jobs: 1,
        }
    }
}

/// External compiler command line
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "dxc".to_string(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the manifest from a file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Logging level as a filter, `None` for an unknown name
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match self.logging.level.to_lowercase().as_str() {
            "off" => Some(log::LevelFilter::Off),
            "error" => Some(log::LevelFilter::Error),
            "warn" => Some(log::LevelFilter::Warn),
            "info" => Some(log::LevelFilter::Info),
            "debug" => Some(log::LevelFilter::Debug),
            "trace" => Some(log::LevelFilter::Trace),
            _ => None,
        }
    }
}
