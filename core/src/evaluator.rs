//! Rate Evaluator.
//!
//! Decides whether an incoming bid/ask quote is plausible against a window of
//! recently accepted quotes for the same instrument, and computes the
//! representative average quote and mid value of that window.
//!
//! ## Validation rule
//! ```text
//! reference_mid = (avg(cached_bids) + avg(cached_asks)) / 2
//! incoming_mid  = (incoming_bid + incoming_ask) / 2
//! deviation     = |incoming_mid - reference_mid| / |reference_mid|
//! accepted      = deviation <= max_deviation        (default 0.01)
//! ```
//!
//! Comparing mids rather than one side filters single bad ticks without a
//! volatility model. The band is inclusive: a quote exactly 1% away passes.
//!
//! ## Determinism
//! Every operation is a pure function of its arguments and the evaluator's
//! immutable settings. Nothing is cached between calls.

use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::EvaluatorConfig;
use crate::decimal::{DecimalContext, ToDecimal, parse_all};
use crate::error::{ConfigError, RateError};
use crate::models::{Quote, QuoteWindow};

static GLOBAL: OnceCell<RateEvaluator> = OnceCell::new();

/// Installs the process-wide evaluator used by the crate's free functions.
///
/// Call once at startup. Installing the same configuration again is a no-op;
/// installing a different one fails, so embedded users cannot silently change
/// each other's precision.
pub fn install(config: EvaluatorConfig) -> Result<&'static RateEvaluator, ConfigError> {
    let evaluator = RateEvaluator::new(config)?;
    let mut fresh = false;
    let installed = GLOBAL.get_or_init(|| {
        fresh = true;
        evaluator
    });

    if *installed != evaluator {
        return Err(ConfigError::AlreadyInstalled);
    }

    if fresh {
        tracing::info!(
            precision = installed.context().precision(),
            max_deviation = %installed.max_deviation(),
            "rate evaluator installed"
        );
    }
    Ok(installed)
}

/// The installed evaluator, or the default one if `install` was never called.
pub fn global() -> &'static RateEvaluator {
    GLOBAL.get_or_init(RateEvaluator::default)
}

/// Full outcome of a validation, for callers that want more than a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateVerdict {
    pub reference_mid: Decimal,
    pub incoming_mid: Decimal,
    pub deviation: Decimal,
    pub accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEvaluator {
    ctx: DecimalContext,
    max_deviation: Decimal,
}

impl Default for RateEvaluator {
    fn default() -> Self {
        let cfg = EvaluatorConfig::default();
        Self {
            ctx: DecimalContext::default(),
            max_deviation: cfg.max_deviation,
        }
    }
}

impl RateEvaluator {
    pub fn new(config: EvaluatorConfig) -> Result<Self, ConfigError> {
        let ctx = config.validate()?;
        Ok(Self {
            ctx,
            max_deviation: config.max_deviation,
        })
    }

    pub fn context(&self) -> &DecimalContext {
        &self.ctx
    }

    pub fn max_deviation(&self) -> Decimal {
        self.max_deviation
    }

    /// Arithmetic mean of `values`.
    ///
    /// # Errors
    /// - [`RateError::EmptyInput`] for an empty slice
    /// - [`RateError::MalformedDecimal`] if any element does not parse
    pub fn average<T: ToDecimal>(&self, values: &[T]) -> Result<Decimal, RateError> {
        if values.is_empty() {
            return Err(RateError::EmptyInput);
        }
        self.ctx.mean(&parse_all(values)?)
    }

    /// `(avg(bids), avg(asks))` of the window.
    pub fn average_quote(&self, window: &QuoteWindow) -> Result<Quote, RateError> {
        Ok(Quote::new(
            self.ctx.mean(window.bids())?,
            self.ctx.mean(window.asks())?,
        ))
    }

    pub fn reference_mid(&self, window: &QuoteWindow) -> Result<Decimal, RateError> {
        self.average_quote(window)?.mid(&self.ctx)
    }

    pub fn evaluate(&self, incoming: &Quote, window: &QuoteWindow) -> Result<RateVerdict, RateError> {
        let reference_mid = self.reference_mid(window)?;
        if reference_mid.is_zero() {
            return Err(RateError::DivisionByZero);
        }

        let incoming_mid = incoming.mid(&self.ctx)?;
        let distance = self.ctx.sub(incoming_mid, reference_mid)?.abs();
        let deviation = self.ctx.div(distance, reference_mid.abs())?;
        let accepted = deviation <= self.max_deviation;

        tracing::debug!(
            reference_mid = %reference_mid,
            incoming_mid = %incoming_mid,
            deviation = %deviation,
            window_len = window.len(),
            accepted,
            "evaluated incoming rate"
        );

        if !accepted {
            tracing::warn!(
                bid = %incoming.bid,
                ask = %incoming.ask,
                deviation = %deviation,
                max_deviation = %self.max_deviation,
                "incoming rate rejected"
            );
        }

        Ok(RateVerdict {
            reference_mid,
            incoming_mid,
            deviation,
            accepted,
        })
    }

    /// True iff the incoming mid lies within `max_deviation` of the window's
    /// reference mid.
    ///
    /// # Errors
    /// - [`RateError::DivisionByZero`] if the reference mid is exactly zero
    /// - [`RateError::EmptyInput`] / [`RateError::WindowLengthMismatch`] for a bad window
    /// - [`RateError::MalformedDecimal`] for unparsable input
    pub fn is_rate_valid<B, A, T, U>(
        &self,
        incoming_bid: &B,
        incoming_ask: &A,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<bool, RateError>
    where
        B: ToDecimal + ?Sized,
        A: ToDecimal + ?Sized,
        T: ToDecimal,
        U: ToDecimal,
    {
        let incoming = Quote::parse(incoming_bid, incoming_ask)?;
        let window = QuoteWindow::parse(cached_bids, cached_asks)?;
        Ok(self.evaluate(&incoming, &window)?.accepted)
    }

    pub fn current_average_quote<T, U>(
        &self,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<(Decimal, Decimal), RateError>
    where
        T: ToDecimal,
        U: ToDecimal,
    {
        let window = QuoteWindow::parse(cached_bids, cached_asks)?;
        let avg = self.average_quote(&window)?;
        Ok((avg.bid, avg.ask))
    }

    /// Canonical "current price" of an instrument: the mid of its average quote.
    pub fn current_mid_value<T, U>(
        &self,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<Decimal, RateError>
    where
        T: ToDecimal,
        U: ToDecimal,
    {
        let window = QuoteWindow::parse(cached_bids, cached_asks)?;
        self.reference_mid(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tracing_test::traced_test;

    const BIDS: [&str; 2] = ["1.1000", "1.1010"];
    const ASKS: [&str; 2] = ["1.1020", "1.1030"];

    #[test]
    fn average_of_three() {
        let ev = RateEvaluator::default();
        assert_eq!(ev.average(&["2.0", "3.0", "4.0"]).unwrap(), dec!(3.0));
    }

    #[test]
    fn average_of_empty_is_error() {
        let ev = RateEvaluator::default();
        let empty: [&str; 0] = [];
        assert_eq!(ev.average(&empty), Err(RateError::EmptyInput));
    }

    #[test]
    fn average_accepts_decimals_and_strings() {
        let ev = RateEvaluator::default();
        let owned = vec!["32.0".to_string(), "32.2".to_string()];
        assert_eq!(ev.average(&owned).unwrap(), dec!(32.1));
        assert_eq!(ev.average(&[dec!(32.4), dec!(32.6)]).unwrap(), dec!(32.5));
    }

    #[test]
    fn reference_mid_of_window() {
        let ev = RateEvaluator::default();
        let window = QuoteWindow::parse(&BIDS, &ASKS).unwrap();
        assert_eq!(ev.reference_mid(&window).unwrap(), dec!(1.1015));
    }

    #[test]
    fn verdict_carries_intermediate_values() {
        let ev = RateEvaluator::default();
        let window = QuoteWindow::parse(&BIDS, &ASKS).unwrap();
        let incoming = Quote::parse("1.1100", "1.1120").unwrap();

        let verdict = ev.evaluate(&incoming, &window).unwrap();

        assert!(verdict.accepted);
        assert_eq!(verdict.reference_mid, dec!(1.1015));
        assert_eq!(verdict.incoming_mid, dec!(1.1110));
        // 0.0095 / 1.1015 at 20 significant digits
        assert_eq!(verdict.deviation, dec!(0.0086246028143440762596));
    }

    // The only test in this binary that touches the process-wide evaluator.
    #[traced_test]
    #[test]
    fn reinstalling_the_same_config_logs_once() {
        install(EvaluatorConfig::default()).unwrap();
        install(EvaluatorConfig::default()).unwrap();

        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("rate evaluator installed"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one install log, got {n}")),
            }
        });
    }

    #[test]
    fn negative_reference_mid_is_measured_by_magnitude() {
        let ev = RateEvaluator::default();
        let verdict = ev
            .evaluate(
                &Quote::parse("1.1", "1.1").unwrap(),
                &QuoteWindow::parse(&["-1.1"], &["-1.1"]).unwrap(),
            )
            .unwrap();

        assert_eq!(verdict.deviation, dec!(2));
        assert!(!verdict.accepted);
    }

    #[test]
    fn zero_reference_mid_is_division_by_zero() {
        let ev = RateEvaluator::default();
        let res = ev.is_rate_valid("1.0", "1.0", &["0", "0"], &["0", "0"]);
        assert_eq!(res, Err(RateError::DivisionByZero));
    }

    #[test]
    fn reference_mid_that_cancels_out_is_division_by_zero() {
        let ev = RateEvaluator::default();
        let res = ev.is_rate_valid("1.0", "1.0", &["-1.0"], &["1.0"]);
        assert_eq!(res, Err(RateError::DivisionByZero));
    }

    #[test]
    fn tighter_threshold_rejects_what_default_accepts() {
        let strict =
            RateEvaluator::new(EvaluatorConfig::default().with_max_deviation(dec!(0.005))).unwrap();
        let ev = RateEvaluator::default();

        assert!(ev.is_rate_valid("1.1100", "1.1120", &BIDS, &ASKS).unwrap());
        assert!(!strict.is_rate_valid("1.1100", "1.1120", &BIDS, &ASKS).unwrap());
    }

    #[test]
    fn invalid_config_does_not_build() {
        let res = RateEvaluator::new(EvaluatorConfig::default().with_precision(4));
        assert!(matches!(res, Err(ConfigError::PrecisionOutOfRange { .. })));
    }

    #[test]
    fn current_average_quote_and_mid() {
        let ev = RateEvaluator::default();
        let bids = ["32.0", "32.2"];
        let asks = ["32.4", "32.6"];

        assert_eq!(
            ev.current_average_quote(&bids, &asks).unwrap(),
            (dec!(32.1), dec!(32.5))
        );
        assert_eq!(ev.current_mid_value(&bids, &asks).unwrap(), dec!(32.3));
    }

    #[traced_test]
    #[test]
    fn rejection_is_logged() {
        let ev = RateEvaluator::default();
        let ok = ev.is_rate_valid("1.1300", "1.1320", &BIDS, &ASKS).unwrap();

        assert!(!ok);
        assert!(logs_contain("incoming rate rejected"));
    }

    #[traced_test]
    #[test]
    fn acceptance_is_not_warned() {
        let ev = RateEvaluator::default();
        assert!(ev.is_rate_valid("1.1100", "1.1120", &BIDS, &ASKS).unwrap());

        assert!(logs_contain("evaluated incoming rate"));
        assert!(!logs_contain("incoming rate rejected"));
    }
}
