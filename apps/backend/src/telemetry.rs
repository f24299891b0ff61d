//! Tracing setup for the server binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset: this service at info, the
/// SQL layers quiet unless explicitly raised.
const DEFAULT_DIRECTIVES: &str = "info,backend=info,sqlx::query=warn,sea_orm=warn";

/// Install the global subscriber: env-filtered, one JSON object per line
/// with event fields flattened to the top level (so `trace_id`, `status`
/// and friends are directly queryable downstream).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .init();
}
