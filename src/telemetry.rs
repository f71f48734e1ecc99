//! `tracing` setup for hosts and the `gantt_layout_dump` tool.
//!
//! Every layout pass runs inside a `build_render_model` span carrying
//! `data_revision` and `expand_revision`. Flatten faults, cache activity and
//! row geometry events are recorded under it, and span close events report
//! how long each pass took. Events go to stderr so stdout stays free for
//! render model output.

/// Filter used when `RUST_LOG` is unset: pass timings and warnings only.
pub const DEFAULT_FILTER: &str = "gantt_rs=info,gantt_rs::api=debug";

/// Installs the default subscriber with [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or the host
/// already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(DEFAULT_FILTER)
}

/// Installs a compact stderr subscriber, preferring `RUST_LOG` over
/// `fallback_filter`.
///
/// Returns `false` when the feature is disabled, the filter does not parse,
/// or a global subscriber is already set.
#[must_use]
pub fn init_tracing(fallback_filter: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt::format::FmtSpan;

        let Ok(filter) = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback_filter))
        else {
            return false;
        };

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback_filter;
        false
    }
}
