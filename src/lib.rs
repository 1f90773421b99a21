#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod asset_paths;
pub mod builder;
pub mod bundle;
pub mod config;
pub mod data;
pub mod error;
pub mod manifest;
pub mod minify;
pub mod models;
pub mod scan;
pub mod telemetry;

pub use builder::{BundlePlan, SiteBuilder};
pub use config::{BuildConfig, DataConfig, Pipeline};
pub use error::{BuildError, BuildReport, BuildResult};
pub use manifest::{ManifestMode, RevManifest};
