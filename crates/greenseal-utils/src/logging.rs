//! Logging and observability infrastructure for greenseal
//!
//! Provides the tracing subscriber setup shared by the CLI and embedders,
//! plus span helpers used by the orchestrator so advancement attempts carry
//! `submission_id` and `phase` fields end to end.

use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise defaults to `greenseal=info` or,
/// with `verbose`, `greenseal=debug`. Safe to call once per process.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("greenseal=debug,info")
            } else {
                EnvFilter::try_new("greenseal=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Span covering a single advancement attempt for one submission.
#[must_use]
pub fn advance_span(submission_id: i64, current_phase: &str, target_phase: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "advance",
        submission_id = %submission_id,
        current_phase = %current_phase,
        target_phase = %target_phase,
    )
}
