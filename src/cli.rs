//! Command line definitions using the clap derive API.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use site_bundler::BuildConfig;

/// Bundle, minify and fingerprint the assets referenced by build blocks in site templates.
#[derive(Parser, Debug)]
#[command(name = "site-bundler", author, version)]
pub struct Cli {
  /// Project directory that configured paths are resolved against
  #[arg(long, short = 'C', global = true, default_value = ".")]
  pub dir: PathBuf,

  /// Configuration file (defaults to site-bundler.json in the project directory)
  #[arg(long, short = 'c', global = true)]
  pub config: Option<PathBuf>,

  /// Log at debug level unless RUST_LOG says otherwise
  #[arg(long, short = 'v', global = true)]
  pub verbose: bool,

  /// Emit logs as JSON lines
  #[arg(long, global = true)]
  pub log_json: bool,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Run the bundling pipeline over every markup file
  Build(BuildArgs),
  /// Merge JSON template data fragments into one file
  MergeData,
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
  /// Minify script bundles
  #[arg(long, value_name = "BOOL")]
  pub minify_scripts: Option<bool>,

  /// Minify stylesheet bundles
  #[arg(long, value_name = "BOOL")]
  pub minify_styles: Option<bool>,

  /// Fingerprint bundle names and record them in the manifest
  #[arg(long, value_name = "BOOL")]
  pub cache_bust: Option<bool>,

  /// Merge into the existing manifest instead of replacing it
  #[arg(long, value_name = "BOOL")]
  pub manifest_merge: Option<bool>,

  /// Directory receiving bundles and the manifest
  #[arg(long, short = 'o')]
  pub output_dir: Option<String>,

  /// Root used to resolve asset references
  #[arg(long)]
  pub search_root: Option<String>,

  /// Directory containing markup sources
  #[arg(long)]
  pub markup_root: Option<String>,

  /// Directory receiving rewritten markup
  #[arg(long)]
  pub markup_output_dir: Option<String>,

  /// Extensions receiving the global revision rewrite (repeatable)
  #[arg(long = "replace-in", value_name = "EXT")]
  pub replace_in_file_types: Vec<String>,
}

impl BuildArgs {
  /// Apply every override that was given on the command line.
  pub fn apply(self, config: &mut BuildConfig) {
    if let Some(value) = self.minify_scripts {
      config.minify_scripts = value;
    }
    if let Some(value) = self.minify_styles {
      config.minify_styles = value;
    }
    if let Some(value) = self.cache_bust {
      config.cache_bust = value;
    }
    if let Some(value) = self.manifest_merge {
      config.manifest_merge = value;
    }
    if let Some(value) = self.output_dir {
      config.output_dir = value;
    }
    if let Some(value) = self.search_root {
      config.search_root = value;
    }
    if let Some(value) = self.markup_root {
      config.markup_root = value;
    }
    if let Some(value) = self.markup_output_dir {
      config.markup_output_dir = value;
    }
    if !self.replace_in_file_types.is_empty() {
      config.replace_in_file_types = self.replace_in_file_types.into_iter().collect();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn overrides_only_given_fields() {
    let cli = Cli::try_parse_from([
      "site-bundler",
      "build",
      "--cache-bust",
      "false",
      "-o",
      "public",
      "--replace-in",
      ".html",
    ])
    .unwrap();
    let Commands::Build(args) = cli.command else {
      panic!("expected build command");
    };

    let mut config = BuildConfig::default();
    args.apply(&mut config);
    assert!(!config.cache_bust);
    assert!(config.minify_scripts);
    assert_eq!(config.output_dir, "public");
    assert_eq!(config.replace_in_file_types.len(), 1);
  }

  #[test]
  fn global_flags_follow_subcommand() {
    let cli = Cli::try_parse_from(["site-bundler", "merge-data", "--verbose", "-C", "site"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.dir, PathBuf::from("site"));
    assert!(matches!(cli.command, Commands::MergeData));
  }
}
