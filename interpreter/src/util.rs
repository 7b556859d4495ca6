use tracing_forest::{printer::Printer, ForestLayer};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// The default `Level` is `INFO`. It can be overridden with `RUST_LOG`.
/// Logs go to stderr so that stdout stays free for program output and
/// protocol messages. Calling it more than once is harmless.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let printer = Printer::new().writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(ForestLayer::from(printer))
        .try_init();
}
