use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::interpreter::{DEFAULT_NUMBER_PRECISION, DEFAULT_RECURSION_LIMIT};

/// Runtime configuration. CLI flags override a config file, which overrides
/// these defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub recursion_limit: usize,
    pub number_precision: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            number_precision: DEFAULT_NUMBER_PRECISION,
        }
    }
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }

    /// Looks for `trylang.toml` in the current directory; falls back to
    /// defaults when absent.
    pub fn load() -> Result<Self, Error> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    fn find_config_file() -> Option<PathBuf> {
        let candidate = PathBuf::from("trylang.toml");
        candidate.exists().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.recursion_limit, 30);
        assert_eq!(config.number_precision, 15);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str("recursion_limit = 10").unwrap();
        assert_eq!(config.recursion_limit, 10);
        assert_eq!(config.number_precision, 15);
    }
}
