//! Build tag discovery, broken into focused submodules for easier testing.

mod blocks;
mod discovery;
mod syntax;

pub use blocks::scan_blocks;
pub use discovery::discover_files;
pub use syntax::MarkupSyntax;
