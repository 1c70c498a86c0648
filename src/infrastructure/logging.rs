use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Debug mode adds targets and source locations to every line.
pub fn init_tracing(level: &str, debug_mode: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug_mode)
        .with_file(debug_mode)
        .with_line_number(debug_mode)
        .try_init();
}
