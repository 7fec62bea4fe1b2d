//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! Every variable is optional; unparsable values are logged and replaced by defaults.

use std::path::PathBuf;
use std::str::FromStr;

use super::layout::LayoutConfig;
use super::validation::ValidatorConfig;

pub const SEED_VAR: &str = "STARMODEL_SEED";
pub const GRID_COLUMNS_VAR: &str = "STARMODEL_GRID_COLUMNS";
pub const CHECK_KEY_ROLES_VAR: &str = "STARMODEL_CHECK_KEY_ROLES";
pub const FLAG_EMPTY_FORMULAS_VAR: &str = "STARMODEL_FLAG_EMPTY_FORMULAS";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// JSON snapshot to load at start instead of the demo model
    /// Example: ./models/retail.json
    pub seed_path: Option<PathBuf>,

    pub layout: LayoutConfig,

    pub validator: ValidatorConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.seed_path = lookup(SEED_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(columns) = parse_var::<usize>(&lookup, GRID_COLUMNS_VAR) {
            if columns == 0 {
                tracing::warn!("{} must be at least 1, keeping default", GRID_COLUMNS_VAR);
            } else {
                config.layout.grid_columns = columns;
            }
        }
        if let Some(enabled) = parse_flag(&lookup, CHECK_KEY_ROLES_VAR) {
            config.validator.check_key_roles = enabled;
        }
        if let Some(enabled) = parse_flag(&lookup, FLAG_EMPTY_FORMULAS_VAR) {
            config.validator.flag_empty_formulas = enabled;
        }

        config
    }

    /// Check if a seed snapshot is configured
    pub fn has_seed(&self) -> bool {
        self.seed_path.is_some()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}
