//! Helpers for resolving and normalising asset references found in build blocks.
//!
//! The responsibilities are split so that filtering external references, normalising
//! bundle paths and expanding lookup candidates can be tested independently.

mod bundle;
mod candidates;
mod filters;

pub use bundle::{fingerprinted_path, normalize_bundle_path};
pub use candidates::{ResolveContext, generate_asset_candidates};
pub use filters::should_ignore_asset_reference;
