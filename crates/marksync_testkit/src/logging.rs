use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn` for everything and `debug` for the
/// marksync crates.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,marksync_client=debug,marksync_backend=debug")
        });
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
