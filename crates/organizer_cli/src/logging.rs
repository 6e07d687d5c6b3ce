use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `--verbose` forces debug; otherwise `RUST_LOG`
/// applies, falling back to info.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(err) = installed {
        tracing::debug!(error = %err, "tracing subscriber already initialized");
    }
}
