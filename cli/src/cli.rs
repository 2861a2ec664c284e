use std::fmt;

use clap::{Args, Parser, Subcommand};
use ratecore::{
    CalculatedRate, ConfigError, Decimal, EvaluatorConfig, Quote, QuoteWindow, RateCalculator,
    RateError, RateEvaluator, RateVerdict, decimal::parse_decimal,
};
use serde_json::{Value, json};

#[derive(Debug, Parser)]
#[command(name = "fxrate", version, about = "Validate and average cached FX quotes")]
pub struct Cli {
    /// Significant digits kept after every arithmetic step (20..=28).
    /// Overrides FXRATE_PRECISION.
    #[arg(long, global = true)]
    pub precision: Option<u32>,

    /// Largest accepted deviation from the reference mid, as a ratio (0.01 == 1%).
    /// Overrides FXRATE_MAX_DEVIATION.
    #[arg(long, global = true)]
    pub max_deviation: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log evaluator decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One window of cached quotes, comma-separated on each side.
#[derive(Debug, Args)]
pub struct WindowArgs {
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub cached_bids: Vec<String>,

    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub cached_asks: Vec<String>,
}

impl WindowArgs {
    fn window(&self) -> Result<QuoteWindow, RateError> {
        QuoteWindow::parse(&self.cached_bids, &self.cached_asks)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Arithmetic mean of the given values
    Average {
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Accept or reject an incoming quote against a cached window
    Validate {
        #[arg(long, allow_hyphen_values = true)]
        bid: String,

        #[arg(long, allow_hyphen_values = true)]
        ask: String,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Current average quote of a window, as a named rate
    Quote {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Current mid value of a window
    Mid {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Cross-rate of a base pair through an intermediate pair
    Cross {
        #[arg(long)]
        name: String,

        /// Intermediate pair bids (e.g. USDTRY)
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        via_bids: Vec<String>,

        /// Intermediate pair asks
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        via_asks: Vec<String>,

        /// Base pair window (e.g. EURUSD)
        #[command(flatten)]
        window: WindowArgs,
    },
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Average { .. } => "average",
            Command::Validate { .. } => "validate",
            Command::Quote { .. } => "quote",
            Command::Mid { .. } => "mid",
            Command::Cross { .. } => "cross",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Average(Decimal),
    Verdict(RateVerdict),
    Rate(CalculatedRate),
    Mid(Decimal),
}

impl Output {
    pub fn to_json(&self) -> Value {
        match self {
            Output::Average(v) => json!({ "average": v.to_string() }),
            Output::Verdict(v) => json!(v),
            Output::Rate(r) => json!(r),
            Output::Mid(v) => json!({ "mid": v.to_string() }),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Average(v) | Output::Mid(v) => write!(f, "{v}"),
            Output::Verdict(v) => write!(
                f,
                "{} reference_mid={} incoming_mid={} deviation={}",
                if v.accepted { "accepted" } else { "rejected" },
                v.reference_mid,
                v.incoming_mid,
                v.deviation
            ),
            Output::Rate(r) => write!(f, "{} bid={} ask={}", r.name, r.bid, r.ask),
        }
    }
}

/// Environment settings with command-line overrides applied.
pub(crate) fn build_evaluator(cli: &Cli) -> Result<RateEvaluator, ConfigError> {
    let mut cfg = EvaluatorConfig::from_env()?;

    if let Some(precision) = cli.precision {
        cfg = cfg.with_precision(precision);
    }
    if let Some(raw) = &cli.max_deviation {
        let max_deviation = parse_decimal(raw).map_err(|_| ConfigError::InvalidEnv {
            key: "--max-deviation",
            value: raw.clone(),
        })?;
        cfg = cfg.with_max_deviation(max_deviation);
    }

    RateEvaluator::new(cfg)
}

pub(crate) fn run_command(command: &Command, evaluator: &RateEvaluator) -> Result<Output, RateError> {
    match command {
        Command::Average { values } => evaluator.average(values).map(Output::Average),

        Command::Validate { bid, ask, window } => {
            let incoming = Quote::parse(bid, ask)?;
            evaluator.evaluate(&incoming, &window.window()?).map(Output::Verdict)
        }

        Command::Quote { name, window } => {
            tracing::Span::current().record("instrument", name.as_str());
            RateCalculator::calculate_rate(evaluator, name, &window.window()?).map(Output::Rate)
        }

        Command::Mid { window } => evaluator.calculate_mid_value(&window.window()?).map(Output::Mid),

        Command::Cross {
            name,
            via_bids,
            via_asks,
            window,
        } => {
            tracing::Span::current().record("instrument", name.as_str());
            let via = QuoteWindow::parse(via_bids, via_asks)?;
            let mid = evaluator.calculate_mid_value(&via)?;
            evaluator
                .calculate_dependent_rate(name, mid, &window.window()?)
                .map(Output::Rate)
        }
    }
}
