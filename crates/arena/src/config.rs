//! Arena configuration loading.
//!
//! Resolution order, later steps overriding earlier ones:
//! 1. Built-in defaults
//! 2. TOML file: `--config`, else `UCB_ARENA_CONFIG`, else `./arena.toml`
//! 3. Environment overrides (`ARENA_SIMULATIONS`, `ARENA_SEED`)
//! 4. Command-line flags (applied by the caller)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ucb_mcts::MctsConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "UCB_ARENA_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "arena.toml";

/// Settings shared by all arena commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Search parameters.
    pub search: MctsConfig,

    /// Base seed for every random generator.
    pub seed: u64,

    /// Directory holding stored trees.
    pub store_dir: PathBuf,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            search: MctsConfig::default(),
            seed: 42,
            store_dir: PathBuf::from("data/trees"),
        }
    }
}

impl ArenaConfig {
    /// Check the search parameters.
    pub fn validate(&self) -> Result<()> {
        self.search.validate().context("invalid [search] settings")
    }
}

/// Load configuration for this process.
///
/// An explicit path must exist and parse. The env-var path and the default
/// file are optional.
pub fn load(explicit: Option<&Path>) -> Result<ArenaConfig> {
    let config = if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        load_from_path(path)?
    } else if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV, path.display());
            load_from_path(&path)?
        } else {
            warn!("{}={} not found, using defaults", CONFIG_ENV, path.display());
            ArenaConfig::default()
        }
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        info!("Loading config from {}", DEFAULT_CONFIG_FILE);
        load_from_path(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
        ArenaConfig::default()
    };

    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load configuration from a specific TOML file.
pub fn load_from_path(path: &Path) -> Result<ArenaConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<ArenaConfig> {
    Ok(toml::from_str(content)?)
}

/// Apply `ARENA_*` overrides looked up through `lookup`.
pub fn apply_env_overrides<F>(mut config: ArenaConfig, lookup: F) -> Result<ArenaConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("ARENA_SIMULATIONS") {
        config.search.num_simulations = value
            .trim()
            .parse()
            .with_context(|| format!("ARENA_SIMULATIONS is not a count: {value:?}"))?;
        debug!(simulations = config.search.num_simulations, "env override");
    }
    if let Some(value) = lookup("ARENA_SEED") {
        config.seed = value
            .trim()
            .parse()
            .with_context(|| format!("ARENA_SEED is not a u64: {value:?}"))?;
        debug!(seed = config.seed, "env override");
    }
    Ok(config)
}
