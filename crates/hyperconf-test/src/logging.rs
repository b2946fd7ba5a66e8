//! Test logging.

use std::env;
use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding the test log filter.
pub const LOG_ENV: &str = "HYPERCONF_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs a compact subscriber that writes through the test harness.
///
/// The filter is read from [`LOG_ENV`] (e.g. `hyperconf_schema=trace`) and
/// defaults to `warn`. Safe to call from every test; only the first call in a
/// process installs anything.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let directives = env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
        let filter = EnvFilter::try_new(&directives)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_test_writer()
            .with_target(true)
            .with_filter(filter);

        // Another harness may have installed a global subscriber already.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}
