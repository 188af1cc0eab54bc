use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Installs the stderr subscriber. `RUST_LOG` overrides the `info` default.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
