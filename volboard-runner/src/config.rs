//! Serializable dashboard configuration.
//!
//! Load order: built-in defaults → optional TOML file → command-line
//! overrides. Call [`DashboardConfig::validate`] after the last layer.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use volboard_core::engine::Horizon;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything one dashboard run needs besides the repository.
///
/// Missing keys in a TOML file fall back to the defaults, so a file may set
/// only the fields it cares about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Ticker symbol, e.g. "AAPL" or "0700.HK".
    pub symbol: String,
    /// Baseline lookback, in periods of the horizon's granularity.
    pub rolling_period: usize,
    /// Window of the x-day horizon, in trading days.
    pub horizon_window: usize,
    /// Neutral band half-width as a fraction (0.05 = 5%).
    pub tolerance_pct: f64,
    /// Calendar days of daily history to fetch.
    pub daily_lookback_days: u32,
    /// Calendar days of weekly history to fetch.
    pub weekly_lookback_days: u32,
    /// How long fetched bar series stay cached. Zero disables caching.
    pub cache_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            rolling_period: 50,
            horizon_window: 1,
            tolerance_pct: 0.0,
            daily_lookback_days: 1800,
            weekly_lookback_days: 900,
            cache_ttl_secs: 300,
        }
    }
}

/// Command-line layer. `None` leaves the underlying value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub symbol: Option<String>,
    pub rolling_period: Option<usize>,
    pub horizon_window: Option<usize>,
    pub tolerance_pct: Option<f64>,
    pub cache_ttl_secs: Option<u64>,
}

impl DashboardConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides on top of this configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(symbol) = overrides.symbol {
            self.symbol = symbol;
        }
        if let Some(period) = overrides.rolling_period {
            self.rolling_period = period;
        }
        if let Some(window) = overrides.horizon_window {
            self.horizon_window = window;
        }
        if let Some(tol) = overrides.tolerance_pct {
            self.tolerance_pct = tol;
        }
        if let Some(ttl) = overrides.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        self
    }

    /// Reject values the engine cannot run with.
    ///
    /// Tolerances at or above 1 are accepted; they only make `Buy` unreachable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.rolling_period <= 1 {
            return Err(ConfigError::Invalid(format!(
                "rolling_period must be at least 2, got {}",
                self.rolling_period
            )));
        }
        if self.horizon_window == 0 {
            return Err(ConfigError::Invalid(
                "horizon_window must be a positive integer".into(),
            ));
        }
        if !self.tolerance_pct.is_finite() || self.tolerance_pct < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance_pct must be a non-negative fraction, got {}",
                self.tolerance_pct
            )));
        }
        if self.daily_lookback_days == 0 || self.weekly_lookback_days == 0 {
            return Err(ConfigError::Invalid(
                "lookback windows must be at least one day".into(),
            ));
        }
        Ok(())
    }

    /// Normalized symbol used for fetching and file names.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    /// The three horizons in report order.
    pub fn horizons(&self) -> [Horizon; 3] {
        [
            Horizon::Daily,
            Horizon::MultiDay {
                window: self.horizon_window,
            },
            Horizon::Weekly,
        ]
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with identical configs share a fingerprint, so a report can
    /// be traced back to the parameters that produced it.
    pub fn fingerprint(&self) -> String {
        // Hash the TOML form: field order is fixed by the struct and it
        // cannot fail for plain scalars.
        let canonical = toml::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}

/// Convert the dashboard's whole-number alert percentage into a fraction.
pub fn alert_pct_to_fraction(alert_pct: u32) -> f64 {
    f64::from(alert_pct) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let config = DashboardConfig::default();
        assert_eq!(config.symbol, "AAPL");
        assert_eq!(config.rolling_period, 50);
        assert_eq!(config.horizon_window, 1);
        assert_eq!(config.tolerance_pct, 0.0);
        assert_eq!(config.daily_lookback_days, 1800);
        assert_eq!(config.weekly_lookback_days, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
            symbol = "0700.HK"
            horizon_window = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.symbol, "0700.HK");
        assert_eq!(config.horizon_window, 5);
        assert_eq!(config.rolling_period, 50);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DashboardConfig::from_toml("window = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_over_file() {
        let config = DashboardConfig::from_toml("rolling_period = 20")
            .unwrap()
            .with_overrides(ConfigOverrides {
                rolling_period: Some(30),
                tolerance_pct: Some(alert_pct_to_fraction(5)),
                ..Default::default()
            });
        assert_eq!(config.rolling_period, 30);
        assert!((config.tolerance_pct - 0.05).abs() < 1e-12);
        assert_eq!(config.symbol, "AAPL");
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let bad = [
            DashboardConfig {
                symbol: "  ".into(),
                ..Default::default()
            },
            DashboardConfig {
                rolling_period: 1,
                ..Default::default()
            },
            DashboardConfig {
                horizon_window: 0,
                ..Default::default()
            },
            DashboardConfig {
                tolerance_pct: -0.1,
                ..Default::default()
            },
            DashboardConfig {
                tolerance_pct: f64::NAN,
                ..Default::default()
            },
            DashboardConfig {
                weekly_lookback_days: 0,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn large_tolerance_is_allowed() {
        let config = DashboardConfig {
            tolerance_pct: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fingerprint_deterministic_and_sensitive() {
        let a = DashboardConfig::default();
        let b = DashboardConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = DashboardConfig {
            horizon_window: 2,
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn horizons_in_report_order() {
        let config = DashboardConfig {
            horizon_window: 3,
            ..Default::default()
        };
        assert_eq!(
            config.horizons(),
            [
                Horizon::Daily,
                Horizon::MultiDay { window: 3 },
                Horizon::Weekly
            ]
        );
    }
}
