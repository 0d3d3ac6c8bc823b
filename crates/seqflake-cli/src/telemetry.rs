use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// Log lines go to stderr so they never mix with IDs written to stdout. The
/// filter is read from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;
    Ok(())
}
