//! Diagnostic output.
//!
//! Every module logs through `tracing`; the binary installs one
//! subscriber at startup.  Per-day attendance analysis logs at `debug`,
//! absorbed parse failures at `warn` and completed runs at `info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const QUIET_FILTER: &str = "payroll_engine=info";
const VERBOSE_FILTER: &str = "payroll_engine=debug,info";

/// Directive used when `RUST_LOG` is unset or unparsable.
fn fallback_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        QUIET_FILTER
    }
}

/// Installs the global subscriber with compact single-line events.
pub fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter(verbose)));
    let events = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_line_number(false);

    tracing_subscriber::registry().with(filter).with(events).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_crate_debug_events() {
        assert_eq!(fallback_filter(false), "payroll_engine=info");
        assert!(fallback_filter(true).contains("payroll_engine=debug"));
        assert!(fallback_filter(true).parse::<EnvFilter>().is_ok());
    }
}
