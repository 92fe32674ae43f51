//! Generator configuration.
//!
//! Values are merged from `propsearch.toml` in the working directory and
//! then from `PROPSEARCH_*` environment variables, later sources winning:
//!
//! ```toml
//! max_jobs = 8
//! dump_property_labels = "data/ml/propsel"
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::dump::PropertyLabelWriter;
use crate::error::{FanoutError, FanoutResult};
use crate::pool::OutputPool;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "propsearch.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "PROPSEARCH_";

/// Settings of the host's fan-out generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Maximum number of concurrent pipeline jobs.
    pub max_jobs: usize,
    /// Directory for property-label training dumps; unset or empty is off.
    pub dump_property_labels: Option<PathBuf>,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_jobs: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            dump_property_labels: None,
        }
    }
}

impl FanoutConfig {
    /// Loads `propsearch.toml` and `PROPSEARCH_*` overrides.
    ///
    /// # Errors
    /// `FanoutError::Config` if a value has the wrong type or is invalid.
    pub fn load() -> FanoutResult<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Extracts the configuration from a host-provided figment.
    ///
    /// # Errors
    /// `FanoutError::Config` if a value has the wrong type or is invalid.
    pub fn from_figment(figment: Figment) -> FanoutResult<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| FanoutError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// `FanoutError::Config` if `max_jobs` is zero.
    pub fn validate(&self) -> FanoutResult<()> {
        if self.max_jobs == 0 {
            return Err(FanoutError::config("max_jobs must be at least 1"));
        }
        Ok(())
    }

    /// Output containers one generator type needs.
    #[must_use]
    pub const fn instances_required(&self) -> usize {
        OutputPool::instances_required(self.max_jobs)
    }

    /// Builds the output pool shared by the host's generators.
    #[must_use]
    pub fn output_pool(&self) -> Arc<OutputPool> {
        Arc::new(OutputPool::new(self.instances_required()))
    }

    /// Dump directory, if dumping is on.
    #[must_use]
    pub fn dump_dir(&self) -> Option<&Path> {
        self.dump_property_labels
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Training-dump writer, if dumping is on.
    #[must_use]
    pub fn label_writer(&self) -> Option<PropertyLabelWriter> {
        self.dump_dir().map(PropertyLabelWriter::new)
    }
}
