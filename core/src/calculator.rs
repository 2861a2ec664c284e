use rust_decimal::Decimal;

use crate::error::RateError;
use crate::evaluator::RateEvaluator;
use crate::models::{CalculatedRate, Quote, QuoteWindow};

/// Calculation surface consumed by a rate collector.
///
/// The collector builds windows from its cache and calls through this trait,
/// so a stub can stand in for the decimal evaluator in its tests.
pub trait RateCalculator {
    /// Whether `incoming` is plausible against the cached `window`.
    fn is_incoming_rate_valid(&self, incoming: &Quote, window: &QuoteWindow)
    -> Result<bool, RateError>;

    /// Mid value of a window, typically the intermediate pair of a cross-rate.
    fn calculate_mid_value(&self, window: &QuoteWindow) -> Result<Decimal, RateError>;

    fn calculate_rate(&self, name: &str, window: &QuoteWindow) -> Result<CalculatedRate, RateError>;

    /// Rate of `name` derived from its base pair window and an intermediate mid.
    fn calculate_dependent_rate(
        &self,
        name: &str,
        intermediate_mid: Decimal,
        window: &QuoteWindow,
    ) -> Result<CalculatedRate, RateError>;
}

impl RateCalculator for RateEvaluator {
    fn is_incoming_rate_valid(
        &self,
        incoming: &Quote,
        window: &QuoteWindow,
    ) -> Result<bool, RateError> {
        Ok(self.evaluate(incoming, window)?.accepted)
    }

    fn calculate_mid_value(&self, window: &QuoteWindow) -> Result<Decimal, RateError> {
        self.reference_mid(window)
    }

    fn calculate_rate(&self, name: &str, window: &QuoteWindow) -> Result<CalculatedRate, RateError> {
        self.rate_from_window(name, window)
    }

    fn calculate_dependent_rate(
        &self,
        name: &str,
        intermediate_mid: Decimal,
        window: &QuoteWindow,
    ) -> Result<CalculatedRate, RateError> {
        self.cross_rate_from_window(name, intermediate_mid, window)
    }
}
