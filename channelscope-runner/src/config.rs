//! Serializable analysis configuration.
//!
//! TOML layout:
//!
//! ```toml
//! agreement_threshold = 0.5
//!
//! [strategy.regression]
//! r2_threshold = 0.6
//!
//! [windows.daily]
//! lookback = 150
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use channelscope_core::consensus::DEFAULT_AGREEMENT_THRESHOLD;
use channelscope_core::domain::Timeframe;
use channelscope_core::strategies::StrategyParams;

use crate::orchestrator::AnalysisOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Partial override of one timeframe's analysis window; unset fields keep
/// the timeframe default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOverride {
    pub lookback: Option<usize>,
    pub sma_short: Option<usize>,
    pub sma_long: Option<usize>,
}

/// On-disk analysis configuration. Every field has a default, so an empty
/// file (or no file) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub agreement_threshold: f64,
    pub strategy: StrategyParams,
    /// Keyed by timeframe tag: "1h", "4h", "daily", "weekly".
    pub windows: BTreeMap<String, WindowOverride>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            agreement_threshold: DEFAULT_AGREEMENT_THRESHOLD,
            strategy: StrategyParams::default(),
            windows: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.agreement_threshold) {
            return Err(ConfigError::Invalid(format!(
                "agreement_threshold must be in [0, 1), got {}",
                self.agreement_threshold
            )));
        }
        for key in self.windows.keys() {
            key.parse::<Timeframe>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Resolve into runtime options, merging window overrides onto the
    /// per-timeframe defaults.
    pub fn to_options(&self) -> Result<AnalysisOptions, ConfigError> {
        self.validate()?;

        let mut windows = BTreeMap::new();
        for (key, patch) in &self.windows {
            let timeframe: Timeframe = key
                .parse::<Timeframe>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            let mut window = timeframe.default_window();
            if let Some(lookback) = patch.lookback {
                window.lookback = lookback;
            }
            if let Some(sma_short) = patch.sma_short {
                window.sma_short = sma_short;
            }
            if let Some(sma_long) = patch.sma_long {
                window.sma_long = sma_long;
            }
            windows.insert(timeframe, window);
        }

        Ok(AnalysisOptions {
            agreement_threshold: self.agreement_threshold,
            params: self.strategy.clone(),
            windows,
        })
    }
}
