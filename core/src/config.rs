use rust_decimal::Decimal;

use crate::decimal::{DEFAULT_PRECISION, DecimalContext, parse_decimal};
use crate::error::ConfigError;

pub const ENV_PRECISION: &str = "FXRATE_PRECISION";
pub const ENV_MAX_DEVIATION: &str = "FXRATE_MAX_DEVIATION";

/// Settings for a [`crate::RateEvaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Significant digits kept after every arithmetic step.
    ///
    /// Must stay within `20..=28`: below 20, chained averages over two
    /// instruments drift enough to matter against a 1% band.
    pub precision: u32,

    /// Largest accepted relative distance between an incoming mid and the
    /// reference mid, as a raw ratio (`0.01` == 1%). Inclusive.
    pub max_deviation: Decimal,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            max_deviation: Decimal::new(1, 2),
        }
    }
}

impl EvaluatorConfig {
    /// Reads `FXRATE_PRECISION` and `FXRATE_MAX_DEVIATION`.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_PRECISION) {
            cfg.precision = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_PRECISION,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup(ENV_MAX_DEVIATION) {
            cfg.max_deviation = parse_decimal(&raw).map_err(|_| ConfigError::InvalidEnv {
                key: ENV_MAX_DEVIATION,
                value: raw.clone(),
            })?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_deviation(mut self, max_deviation: Decimal) -> Self {
        self.max_deviation = max_deviation;
        self
    }

    pub fn validate(&self) -> Result<DecimalContext, ConfigError> {
        if self.max_deviation < Decimal::ZERO {
            return Err(ConfigError::NegativeDeviation(self.max_deviation.to_string()));
        }
        DecimalContext::new(self.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = EvaluatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, EvaluatorConfig::default());
        assert_eq!(cfg.precision, 20);
        assert_eq!(cfg.max_deviation, dec!(0.01));
    }

    #[test]
    fn reads_overrides() {
        let cfg = EvaluatorConfig::from_lookup(lookup(&[
            (ENV_PRECISION, "28"),
            (ENV_MAX_DEVIATION, "0.005"),
        ]))
        .unwrap();
        assert_eq!(cfg.precision, 28);
        assert_eq!(cfg.max_deviation, dec!(0.005));
    }

    #[test]
    fn unparsable_values_are_errors() {
        let err = EvaluatorConfig::from_lookup(lookup(&[(ENV_PRECISION, "high")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_PRECISION,
                value: "high".into()
            }
        );

        let err =
            EvaluatorConfig::from_lookup(lookup(&[(ENV_MAX_DEVIATION, "1%")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_MAX_DEVIATION, .. }));
    }

    #[test]
    fn validation_catches_bad_ranges() {
        let low = EvaluatorConfig::default().with_precision(10);
        assert!(matches!(
            low.validate(),
            Err(ConfigError::PrecisionOutOfRange { precision: 10, .. })
        ));

        let negative = EvaluatorConfig::default().with_max_deviation(dec!(-0.01));
        assert!(matches!(negative.validate(), Err(ConfigError::NegativeDeviation(_))));

        let zero = EvaluatorConfig::default().with_max_deviation(Decimal::ZERO);
        assert!(zero.validate().is_ok());
    }
}
