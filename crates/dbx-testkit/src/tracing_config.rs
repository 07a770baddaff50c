//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info,dbx_graphql=debug,dbx_graphql_connector=debug";

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Uses `RUST_LOG` if set, otherwise debug output for the dbx crates.
///
/// # Example
///
/// ```rust,ignore
/// use dbx_testkit::init_test_tracing;
///
/// #[tokio::test]
/// async fn my_test() {
///     init_test_tracing();
///     // ... test code
/// }
/// ```
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_ansi(false)
                    .compact(),
            )
            .try_init();
    });
}
