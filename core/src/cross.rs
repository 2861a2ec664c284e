//! Named rates and two-hop cross-rates.
//!
//! A cross-rate values a base pair in a third currency through an
//! intermediate pair, e.g. `EURTRY` from `EURUSD` and `USDTRY`:
//!
//! ```text
//! hop 1: usdtry_mid = derive_cross_mid(usdtry_bids, usdtry_asks)
//! hop 2: eurtry     = derive_cross_rate("EURTRY", usdtry_mid, eurusd_bids, eurusd_asks)
//!        eurtry.bid = avg(eurusd_bids) * usdtry_mid
//!        eurtry.ask = avg(eurusd_asks) * usdtry_mid
//! ```
//!
//! Both hops are plain functions; chaining them is the caller's job.

use rust_decimal::Decimal;

use crate::decimal::ToDecimal;
use crate::error::RateError;
use crate::evaluator::RateEvaluator;
use crate::models::{CalculatedRate, QuoteWindow};

impl RateEvaluator {
    /// Mid value of the intermediate instrument's window (first hop).
    pub fn derive_cross_mid<T, U>(
        &self,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<Decimal, RateError>
    where
        T: ToDecimal,
        U: ToDecimal,
    {
        self.current_mid_value(cached_bids, cached_asks)
    }

    /// Average quote of a window, named and timestamped.
    pub fn calculate_rate<T, U>(
        &self,
        name: &str,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<CalculatedRate, RateError>
    where
        T: ToDecimal,
        U: ToDecimal,
    {
        let window = QuoteWindow::parse(cached_bids, cached_asks)?;
        self.rate_from_window(name, &window)
    }

    /// Second hop: scales the base pair's average quote by the intermediate mid.
    pub fn derive_cross_rate<M, T, U>(
        &self,
        name: &str,
        intermediate_mid: &M,
        cached_bids: &[T],
        cached_asks: &[U],
    ) -> Result<CalculatedRate, RateError>
    where
        M: ToDecimal + ?Sized,
        T: ToDecimal,
        U: ToDecimal,
    {
        let mid = intermediate_mid.to_decimal()?;
        let window = QuoteWindow::parse(cached_bids, cached_asks)?;
        self.cross_rate_from_window(name, mid, &window)
    }

    pub(crate) fn rate_from_window(
        &self,
        name: &str,
        window: &QuoteWindow,
    ) -> Result<CalculatedRate, RateError> {
        let avg = self.average_quote(window)?;

        tracing::debug!(rate = name, bid = %avg.bid, ask = %avg.ask, "rate calculated");
        Ok(CalculatedRate::new(name, avg.bid, avg.ask))
    }

    pub(crate) fn cross_rate_from_window(
        &self,
        name: &str,
        intermediate_mid: Decimal,
        window: &QuoteWindow,
    ) -> Result<CalculatedRate, RateError> {
        let avg = self.average_quote(window)?;
        let ctx = self.context();
        let bid = ctx.mul(avg.bid, intermediate_mid)?;
        let ask = ctx.mul(avg.ask, intermediate_mid)?;

        tracing::debug!(
            rate = name,
            intermediate_mid = %intermediate_mid,
            bid = %bid,
            ask = %ask,
            "cross rate derived"
        );
        Ok(CalculatedRate::new(name, bid, ask))
    }
}
