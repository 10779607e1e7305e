//! Tracing subscriber setup shared by the CLI and tests.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies. A
//! bare level ("info", "debug") is scoped to the mixcut crates with
//! dependencies held at `warn`, so a debug run doesn't drown in decoder
//! internals. Full filter strings ("mixcut_preview_engine=trace,warn")
//! pass through untouched.

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from the given configuration.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

/// Expand a bare level into per-crate directives for the workspace.
fn default_directives(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    format!(
        "warn,mixcut={level},mixcut_common={level},mixcut_timeline_model={level},\
         mixcut_preview_engine={level},mixcut_interaction={level},\
         mixcut_recording_engine={level}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_workspace_crates() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("mixcut_preview_engine=debug"));
        assert!(directives.contains("mixcut_recording_engine=debug"));
    }

    #[test]
    fn test_explicit_filter_passes_through() {
        let filter = "mixcut_preview_engine=trace,warn";
        assert_eq!(default_directives(filter), filter);
    }
}
