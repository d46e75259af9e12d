use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Log targets owned by this workspace. Events from other crates are dropped
/// by [`layer`].
pub const WORKSPACE_TARGETS: [&str; 4] =
    ["contract_chat", "api", "completion_service", "chat_session"];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_workspace_target(target: &str) -> bool {
    WORKSPACE_TARGETS
        .iter()
        .any(|prefix| target == *prefix || target.starts_with(&format!("{prefix}::")))
}

/// Build a formatting layer that renders only events emitted by this workspace.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line` and target
/// - Span close events (durations for instrumented handlers)
/// - ANSI colors only when stdout is a terminal
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Level directive for a single workspace target, e.g. `chat_session=debug`.
///
/// Returns `None` if `target` is not one of [`WORKSPACE_TARGETS`].
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    if !WORKSPACE_TARGETS.contains(&target) {
        return None;
    }
    let s = format!("{target}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// EnvFilter from `RUST_LOG`; when unset, `default` globally with every
/// workspace target set to `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        WORKSPACE_TARGETS
            .iter()
            .filter_map(|t| level_directive(t, level))
            .fold(EnvFilter::new(default), EnvFilter::add_directive)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_workspace_targets() {
        assert!(is_workspace_target("api"));
        assert!(is_workspace_target("api::routes::completion"));
        assert!(is_workspace_target("chat_session::session"));
        assert!(!is_workspace_target("apis"));
        assert!(!is_workspace_target("hyper::proto"));
    }

    #[test]
    fn directive_only_for_known_targets() {
        let d = level_directive("chat_session", Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "chat_session=debug");
        assert!(level_directive("reqwest", Level::DEBUG).is_none());
    }
}
