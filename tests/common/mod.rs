//! Shared helpers for integration tests.

use tracing_subscriber::EnvFilter;

/// Route `tracing` output into the test harness. Set `RUST_LOG=spark_layout=trace`
/// to see callback re-entry while a test runs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
