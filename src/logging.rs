use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for the ssm-async CLI
///
/// - NO_COLOR / SSM_ASYNC_NO_COLOR disable colors
/// - FORCE_COLOR / SSM_ASYNC_FORCE_COLOR force them on
/// - RUST_LOG filters, defaulting to "info"
/// - SSM_ASYNC_LOG_JSON switches to JSON lines with timestamps
pub fn init_logging() {
    let use_ansi = should_use_colors(|key| env::var_os(key).is_some());
    let use_json = env::var_os("SSM_ASYNC_LOG_JSON").is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let compact = (!use_json).then(|| {
        fmt::layer()
            .with_ansi(use_ansi)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .without_time()
            .compact()
    });
    let json = use_json.then(|| fmt::layer().json().with_current_span(false));

    // A subscriber may already be installed when embedded in a larger program.
    let _ = tracing_subscriber::registry()
        .with(compact)
        .with(json)
        .with(env_filter)
        .try_init();
}

/// Determine if we should use ANSI colors; `is_set` reports whether an
/// environment variable is present.
fn should_use_colors<F>(is_set: F) -> bool
where
    F: Fn(&str) -> bool,
{
    if is_set("NO_COLOR") || is_set("SSM_ASYNC_NO_COLOR") {
        return false;
    }

    if is_set("FORCE_COLOR") || is_set("SSM_ASYNC_FORCE_COLOR") {
        return true;
    }

    // tracing-subscriber handles TTY detection
    true
}
