use tracing_subscriber::EnvFilter;

/// Install the global subscriber for the CLI.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. All log
/// output goes to stderr so the price report on stdout stays pipeable.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}
