//! Logging setup for the command line entry point.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output options for the installed subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
  /// Raise the default level from `info` to `debug`.
  pub verbose: bool,
  /// Emit one JSON object per event instead of human readable lines.
  pub json: bool,
}

impl LogOptions {
  fn default_directive(self) -> &'static str {
    if self.verbose { "debug" } else { "info" }
  }

  /// Filter honouring `RUST_LOG`, falling back to the level implied by the options.
  pub fn filter(self) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
  }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for the report.
pub fn init_logging(options: LogOptions) -> Result<()> {
  let registry = tracing_subscriber::registry().with(options.filter());
  let installed = if options.json {
    registry
      .with(
        tracing_subscriber::fmt::layer()
          .json()
          .with_current_span(true)
          .with_writer(std::io::stderr),
      )
      .try_init()
  } else {
    registry
      .with(
        tracing_subscriber::fmt::layer()
          .with_target(false)
          .with_writer(std::io::stderr),
      )
      .try_init()
  };
  installed.context("failed to install log subscriber")
}
