use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Installs the global fmt subscriber once; later calls are no-ops.
///
/// `RUST_LOG` wins over `default_directive`. Output goes to stderr so a
/// binary's stdout stays machine-readable.
pub fn init_logger(service_name: &'static str, default_directive: &str) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let installed = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init();

        match installed {
            Ok(()) => tracing::debug!(service = service_name, "logger initialized"),
            // someone else (a test harness, an embedding service) got there first
            Err(_) => tracing::debug!(service = service_name, "logger already set"),
        }
    });
}
