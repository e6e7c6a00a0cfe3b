//! Log output for the CLI.
//!
//! The library logs skipped programs and join anomalies at `debug`, catalog
//! load summaries at `info`, and suspicious cutoffs at `warn`. Everything
//! goes to stderr so stdout stays clean for tables and TSV.

use std::io::IsTerminal;
use thiserror::Error;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

/// Directive added by `--verbose`: this crate's own debug logs, without
/// raising dependencies to debug.
const VERBOSE_DIRECTIVE: &str = "admit_rank=debug";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log_level '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("could not install log subscriber: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` replaces `log_level` entirely when set. `verbose` adds
/// `admit_rank=debug` on top of whichever filter is in effect.
pub fn init(log_level: &str, verbose: bool) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(log_level)?,
    };
    let filter = if verbose { with_verbose(filter)? } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn parse_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::Filter {
        value: log_level.to_string(),
        source,
    })
}

fn with_verbose(filter: EnvFilter) -> Result<EnvFilter, TelemetryError> {
    let directive: Directive = VERBOSE_DIRECTIVE.parse().map_err(|source| TelemetryError::Filter {
        value: VERBOSE_DIRECTIVE.to_string(),
        source,
    })?;
    Ok(filter.add_directive(directive))
}
