use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{DecimalContext, ToDecimal, parse_all};
use crate::error::RateError;

/// A single bid/ask observation for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
}

impl Quote {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self { bid, ask }
    }

    pub fn parse<B, A>(bid: &B, ask: &A) -> Result<Self, RateError>
    where
        B: ToDecimal + ?Sized,
        A: ToDecimal + ?Sized,
    {
        Ok(Self {
            bid: bid.to_decimal()?,
            ask: ask.to_decimal()?,
        })
    }

    /// `(bid + ask) / 2`
    pub fn mid(&self, ctx: &DecimalContext) -> Result<Decimal, RateError> {
        ctx.midpoint(self.bid, self.ask)
    }
}

/// Recently accepted bids and asks for one instrument, as handed over by the
/// caller. One entry per observation on each side; neither side may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteWindow {
    bids: Vec<Decimal>,
    asks: Vec<Decimal>,
}

impl QuoteWindow {
    pub fn new(bids: Vec<Decimal>, asks: Vec<Decimal>) -> Result<Self, RateError> {
        if bids.is_empty() || asks.is_empty() {
            return Err(RateError::EmptyInput);
        }
        if bids.len() != asks.len() {
            return Err(RateError::WindowLengthMismatch {
                bids: bids.len(),
                asks: asks.len(),
            });
        }
        Ok(Self { bids, asks })
    }

    pub fn parse<T, U>(bids: &[T], asks: &[U]) -> Result<Self, RateError>
    where
        T: ToDecimal,
        U: ToDecimal,
    {
        Self::new(parse_all(bids)?, parse_all(asks)?)
    }

    pub fn from_quotes(quotes: &[Quote]) -> Result<Self, RateError> {
        let (bids, asks) = quotes.iter().map(|q| (q.bid, q.ask)).unzip();
        Self::new(bids, asks)
    }

    pub fn bids(&self) -> &[Decimal] {
        &self.bids
    }

    pub fn asks(&self) -> &[Decimal] {
        &self.asks
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    /// Never true for a window built through `new`.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }
}

/// A named rate produced from a cached window, e.g. `USDTRY` or a derived
/// `EURTRY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedRate {
    pub name: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl CalculatedRate {
    pub fn new(name: impl Into<String>, bid: Decimal, ask: Decimal) -> Self {
        Self {
            name: name.into(),
            bid,
            ask,
            timestamp: Utc::now(),
        }
    }

    pub fn quote(&self) -> Quote {
        Quote::new(self.bid, self.ask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_mid_is_average_of_sides() {
        let q = Quote::parse("1.1100", "1.1120").unwrap();
        assert_eq!(q.mid(&DecimalContext::default()).unwrap(), dec!(1.1110));
    }

    #[test]
    fn quote_parse_reports_bad_side() {
        let err = Quote::parse("1.1", "oops").unwrap_err();
        assert_eq!(err, RateError::MalformedDecimal { input: "oops".into() });
    }

    #[test]
    fn window_rejects_empty_sides() {
        let empty: [&str; 0] = [];
        assert_eq!(QuoteWindow::parse(&empty, &["1.0"]), Err(RateError::EmptyInput));
        assert_eq!(QuoteWindow::parse(&["1.0"], &empty), Err(RateError::EmptyInput));
    }

    #[test]
    fn window_rejects_mismatched_sides() {
        let err = QuoteWindow::parse(&["1.0", "1.1"], &["1.2"]).unwrap_err();
        assert_eq!(err, RateError::WindowLengthMismatch { bids: 2, asks: 1 });
    }

    #[test]
    fn window_from_quotes_splits_sides() {
        let window = QuoteWindow::from_quotes(&[
            Quote::new(dec!(1.1000), dec!(1.1020)),
            Quote::new(dec!(1.1010), dec!(1.1030)),
        ])
        .unwrap();

        assert_eq!(window.len(), 2);
        assert_eq!(window.bids(), &[dec!(1.1000), dec!(1.1010)]);
        assert_eq!(window.asks(), &[dec!(1.1020), dec!(1.1030)]);
    }

    #[test]
    fn calculated_rate_serializes_decimals_as_strings() {
        let rate = CalculatedRate::new("USDTRY", dec!(32.1), dec!(32.5));
        let json = serde_json::to_value(&rate).unwrap();

        assert_eq!(json["name"], "USDTRY");
        assert_eq!(json["bid"], "32.1");
        assert_eq!(json["ask"], "32.5");
        assert!(json["timestamp"].is_string());
    }
}
