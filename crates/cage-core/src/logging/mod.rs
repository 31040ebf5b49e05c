use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON logging on stderr.
///
/// When `quiet` is true, only error-level events from cage crates are
/// emitted. Otherwise info-level and above are emitted. `RUST_LOG`
/// directives are applied on top.
pub fn init_logging(quiet: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(log_filter(quiet))
        .init();
}

fn log_filter(quiet: bool) -> EnvFilter {
    let level = if quiet { "error" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["cage", "cage_core"] {
        match format!("{target}={level}").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Warning: Invalid log directive for '{target}': {e}"),
        }
    }
    filter
}
