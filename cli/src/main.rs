pub mod cli;

use anyhow::Context;
use clap::Parser;
use common::logger::{TraceId, child_span, init_logger, root_span};

use cli::*;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logger("fxrate", if cli.verbose { "debug" } else { "warn" });

    let trace_id = TraceId::new();
    let span = root_span(cli.command.label(), &trace_id);
    let _guard = span.enter();

    let evaluator = build_evaluator(&cli).context("invalid evaluator configuration")?;

    let output = child_span("evaluate")
        .in_scope(|| run_command(&cli.command, &evaluator))
        .with_context(|| format!("{} failed", cli.command.label()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.to_json())?);
    } else {
        println!("{output}");
    }

    Ok(())
}
