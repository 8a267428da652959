//! Optional `range-query.toml` configuration.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde_derive::Deserialize;

pub const DEFAULT_CONFIG: &str = "range-query.toml";

#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gen: GenConfig,
    pub bench: BenchConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenConfig {
    /// Values are drawn from `[-value_range, value_range]`.
    pub value_range: i64,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    pub iterations: u32,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            value_range: 100,
            seed: None,
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig { iterations: 10 }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `path` if given, otherwise `range-query.toml` in the working
    /// directory if it exists, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
            None => return Ok(Config::default()),
        };
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let config = Config::from_toml(&text)
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
