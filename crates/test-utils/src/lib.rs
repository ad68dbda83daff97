pub mod builders;
pub mod fake_executor;

use std::sync::Once;

use cmdguard::process_table::mock::MockProcessTable;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// A small, fixed process table:
///
/// | pid  | name      |
/// |------|-----------|
/// | 1    | systemd   |
/// | 612  | sshd      |
/// | 4242 | nginx     |
/// | 4243 | nginx     |
/// | 5001 | python3   |
pub fn fake_process_table() -> MockProcessTable {
    MockProcessTable::new()
        .with_process(1, "systemd", "/sbin/init splash")
        .with_process(612, "sshd", "sshd: /usr/sbin/sshd -D")
        .with_process(4242, "nginx", "nginx: master process /usr/sbin/nginx")
        .with_process(4243, "nginx", "nginx: worker process")
        .with_process(5001, "python3", "python3 -m http.server 8000")
}
