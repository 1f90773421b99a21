//! Error kinds raised by the bundling pipeline and the aggregate report.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures the pipeline can encounter while processing a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A build block could not be delimited or is internally inconsistent.
  #[error("malformed build block in {file} at line {line}: {reason}")]
  MalformedBlock {
    /// Markup file containing the block.
    file: PathBuf,
    /// 1-based line of the offending tag.
    line: usize,
    /// Human readable description.
    reason: String,
  },

  /// A referenced asset could not be found under any search root.
  #[error("missing asset `{asset}` referenced by {output} in {file}")]
  MissingAsset {
    /// Markup file containing the reference.
    file: PathBuf,
    /// Declared bundle path of the block.
    output: String,
    /// Reference as written in the markup.
    asset: String,
  },

  /// Minification rejected the bundled content.
  #[error("failed to transform {output} at line {line}: {reason}")]
  Transform {
    /// Declared bundle path.
    output: String,
    /// 1-based line within the bundle.
    line: usize,
    /// Human readable description.
    reason: String,
  },

  /// The revision manifest could not be read for merging or persisted.
  #[error("failed to write manifest {path}: {reason}")]
  ManifestWrite {
    /// Manifest location.
    path: PathBuf,
    /// Human readable description.
    reason: String,
  },

  /// A configured glob could not be compiled.
  #[error("invalid glob `{pattern}`: {reason}")]
  InvalidGlob {
    /// Pattern as configured.
    pattern: String,
    /// Compiler message.
    reason: String,
  },

  /// Unexpected I/O failure while reading markup or writing output.
  #[error("i/o error on {path}: {source}")]
  Io {
    /// Path being read or written.
    path: PathBuf,
    /// Underlying error.
    #[source]
    source: std::io::Error,
  },
}

impl BuildError {
  /// Wrap an I/O error with the path it occurred on.
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }

  /// Whether the error aborts the whole build rather than being collected.
  pub fn is_fatal(&self) -> bool {
    matches!(
      self,
      Self::Transform { .. } | Self::InvalidGlob { .. } | Self::Io { .. }
    )
  }
}

/// Convenience alias for pipeline results.
pub type BuildResult<T> = Result<T, BuildError>;

/// Summary of a completed build, including every recoverable problem found.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Markup files rewritten and written to disk.
  pub markup_written: Vec<PathBuf>,
  /// Bundle files written to disk.
  pub bundles_written: Vec<PathBuf>,
  /// Manifest location when one was written.
  pub manifest_path: Option<PathBuf>,
  /// Errors collected during the run.
  pub errors: Vec<BuildError>,
}

impl BuildReport {
  /// Returns `true` when no error was recorded.
  pub fn is_success(&self) -> bool {
    self.errors.is_empty()
  }

  /// Record a recoverable error.
  pub fn push(&mut self, error: BuildError) {
    tracing::warn!(%error, "build problem recorded");
    self.errors.push(error);
  }
}

impl fmt::Display for BuildReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "wrote {} bundle(s) and {} markup file(s)",
      self.bundles_written.len(),
      self.markup_written.len()
    )?;
    if let Some(path) = &self.manifest_path {
      writeln!(f, "manifest: {}", path.display())?;
    }
    if !self.errors.is_empty() {
      writeln!(f, "{} problem(s):", self.errors.len())?;
      for error in &self.errors {
        writeln!(f, "  - {error}")?;
      }
    }
    Ok(())
  }
}
