use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use site_bundler::data::write_merged_data;
use site_bundler::telemetry::{LogOptions, init_logging};
use site_bundler::{BuildConfig, SiteBuilder};

mod cli;

use cli::{Cli, Commands};

fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<BuildConfig> {
  match explicit {
    Some(path) => BuildConfig::from_path(path),
    None => BuildConfig::discover(dir),
  }
}

fn run(cli: Cli) -> Result<bool> {
  let mut config = load_config(&cli.dir, cli.config.as_deref())?;

  match cli.command {
    Commands::Build(args) => {
      args.apply(&mut config);
      let report = SiteBuilder::new(&config, &cli.dir)
        .build()
        .context("build aborted")?;
      print!("{report}");
      Ok(report.is_success())
    }
    Commands::MergeData => {
      let merged = write_merged_data(&config.data, &cli.dir)?;
      println!(
        "merged {} fragment(s) into {}",
        merged.fragments.len(),
        config.data.output
      );
      Ok(true)
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let options = LogOptions {
    verbose: cli.verbose,
    json: cli.log_json,
  };
  if let Err(err) = init_logging(options) {
    eprintln!("Error: {err:#}");
  }

  match run(cli) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(err) => {
      eprintln!("Error: {err:#}");
      ExitCode::FAILURE
    }
  }
}
