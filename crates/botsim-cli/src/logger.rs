use tracing_subscriber::filter::{Directive, EnvFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Logs go to stderr so JSON output on stdout stays parseable. `RUST_LOG`
/// directives are added on top of `level`.
pub fn init(level: &str) -> anyhow::Result<()> {
    let default: Directive = level.parse()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(default)
                .from_env()?,
        )
        .init();
    Ok(())
}
