//! Rate validation and averaging for a forex collector.
//!
//! The free functions below run on the process-wide evaluator (see
//! [`install`]). Embedders that need isolated settings build their own
//! [`RateEvaluator`] and call its methods directly.

pub mod calculator;
pub mod config;
pub mod cross;
pub mod decimal;
pub mod error;
pub mod evaluator;
pub mod models;

pub use calculator::RateCalculator;
pub use config::EvaluatorConfig;
pub use decimal::{DecimalContext, ToDecimal};
pub use error::{ConfigError, RateError};
pub use evaluator::{RateEvaluator, RateVerdict, global, install};
pub use models::{CalculatedRate, Quote, QuoteWindow};

pub use rust_decimal::Decimal;

pub fn average<T: ToDecimal>(values: &[T]) -> Result<Decimal, RateError> {
    global().average(values)
}

pub fn is_rate_valid<B, A, T, U>(
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
    global().is_rate_valid(incoming_bid, incoming_ask, cached_bids, cached_asks)
}

pub fn current_average_quote<T, U>(
    cached_bids: &[T],
    cached_asks: &[U],
) -> Result<(Decimal, Decimal), RateError>
where
    T: ToDecimal,
    U: ToDecimal,
{
    global().current_average_quote(cached_bids, cached_asks)
}

pub fn current_mid_value<T, U>(cached_bids: &[T], cached_asks: &[U]) -> Result<Decimal, RateError>
where
    T: ToDecimal,
    U: ToDecimal,
{
    global().current_mid_value(cached_bids, cached_asks)
}

pub fn derive_cross_mid<T, U>(cached_bids: &[T], cached_asks: &[U]) -> Result<Decimal, RateError>
where
    T: ToDecimal,
    U: ToDecimal,
{
    global().derive_cross_mid(cached_bids, cached_asks)
}

pub fn calculate_rate<T, U>(
    name: &str,
    cached_bids: &[T],
    cached_asks: &[U],
) -> Result<CalculatedRate, RateError>
where
    T: ToDecimal,
    U: ToDecimal,
{
    global().calculate_rate(name, cached_bids, cached_asks)
}

pub fn derive_cross_rate<M, T, U>(
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
    global().derive_cross_rate(name, intermediate_mid, cached_bids, cached_asks)
}
