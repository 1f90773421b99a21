//! Pipeline stages turning a scanned build block into a final bundle and rewritten markup.

pub mod concat;
pub mod fingerprint;
pub mod rewrite;
pub mod transform;
