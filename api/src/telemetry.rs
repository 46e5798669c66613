//! Process-wide tracing setup (spec §6 `LOG_LEVEL`/`LOG_JSON`), grounded
//! in `ai-llm-service::telemetry`'s RFC3339-via-chrono timer and
//! terminal-aware ANSI handling, widened from that module's
//! single-crate filter to a global subscriber covering every crate in
//! the workspace.

use std::io::{self, IsTerminal};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Installs the global subscriber. `log_json=true` emits newline-delimited
/// JSON (suitable for log aggregation); otherwise a compact human format
/// with ANSI color when stdout is a terminal.
pub fn init(log_level: &str, log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_timer(ChronoRfc3339Utc)
        .with_target(true)
        .with_env_filter(filter);

    if log_json {
        builder.json().init();
    } else {
        builder.with_ansi(io::stdout().is_terminal()).init();
    }
}
