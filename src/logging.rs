use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console logging on stderr. Stdout carries the JSON-lines protocol and
/// must never see log output.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to this crate only.
pub fn init(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
