//! Logging infrastructure for SiteQA.
//!
//! Everything goes to stderr so stdout stays clean for command output. The
//! server is usually run with `logging.json: true` so request spans can be
//! shipped as structured records.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber described by `config`.
///
/// `config.log_level` is an `EnvFilter` directive string such as `debug` or
/// `siteqa_knowledge=trace,info`; `RUST_LOG` has already been folded into it
/// by [`AppConfig::load`].
///
/// # Example
/// ```no_run
/// use siteqa_core::{logging::init_logging, AppConfig};
///
/// # fn example() -> siteqa_core::AppResult<()> {
/// let config = AppConfig::load()?;
/// init_logging(&config)?;
/// # Ok(())
/// # }
/// ```
pub fn init_logging(config: &AppConfig) -> AppResult<()> {
    let filter = build_filter(config.log_level.as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(use_color(config.no_color)),
            )
            .try_init()
    };

    installed.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    EnvFilter::try_new(log_level.unwrap_or(DEFAULT_FILTER))
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))
}

fn use_color(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none()
}
