//! Layered CLI configuration.
//!
//! Sources, lowest to highest precedence:
//! 1) built-in defaults
//! 2) YAML file passed with `--config`
//! 3) environment variables prefixed with `ODATA_ADAPT__` (`__` separates nesting)
//! 4) command-line overrides

use std::path::Path;

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use odata_adapt::{HiddenFields, QueryLimits};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "ODATA_ADAPT__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub limits: QueryLimits,
    /// Hidden fields keyed by record type.
    pub visibility: HiddenFields,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

/// Values from the command line that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub record_type: String,
    pub hidden: Vec<String>,
    pub verbose: u8,
}

impl AppConfig {
    /// Build the figment for `path` without extracting it.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load defaults, then the optional YAML file, then the environment.
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or the merged values do
    /// not match the configuration schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .extract()
            .context("failed to load configuration")
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if !cli.hidden.is_empty() {
            self.visibility
                .insert(cli.record_type.clone(), cli.hidden.iter().cloned());
        }

        let level = match cli.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            level.clone_into(&mut self.logging.level);
        }
    }

    /// Render as YAML for `--print-config`.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}
