use thiserror::Error;

/// Failures of a single averaging or validation call.
///
/// Every variant is scoped to the call that produced it. Nothing here is
/// retried or recovered inside the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("cannot average an empty collection")]
    EmptyInput,

    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed decimal: {input:?}")]
    MalformedDecimal { input: String },

    #[error("window length mismatch: {bids} bids vs {asks} asks")]
    WindowLengthMismatch { bids: usize, asks: usize },

    #[error("decimal overflow")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("precision {precision} outside supported range {min}..={max}")]
    PrecisionOutOfRange { precision: u32, min: u32, max: u32 },

    #[error("max deviation must not be negative: {0}")]
    NegativeDeviation(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("a different evaluator configuration is already installed")]
    AlreadyInstalled,
}
