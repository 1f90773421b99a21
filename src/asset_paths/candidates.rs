use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directories consulted when resolving a build block reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Directory alternate search roots are resolved against.
    pub base_dir: &'a Path,
    /// Directory holding the markup file that declared the block.
    pub markup_dir: &'a Path,
    /// Configured search root.
    pub search_root: &'a Path,
}

/// Generate candidate filesystem paths for a reference inside a build block.
///
/// Relative references are tried next to the markup file first, then under each alternate
/// search root declared on the block, then under the configured search root. Root-relative
/// references (`/scripts/a.js`) skip the markup directory. Query strings and fragments are
/// dropped before joining.
pub fn generate_asset_candidates(
    context: &ResolveContext<'_>,
    alternate_roots: &[String],
    reference: &str,
) -> Vec<PathBuf> {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    if path.is_empty() {
        return Vec::new();
    }

    let mut builder = CandidateBuilder::default();
    let rooted = path.starts_with('/');
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }

    if !rooted {
        builder.push(context.markup_dir.join(trimmed));
    }
    for root in alternate_roots {
        builder.push(context.base_dir.join(root).join(trimmed));
    }
    builder.push(context.search_root.join(trimmed));

    builder.result
}

#[derive(Default)]
struct CandidateBuilder {
    seen: BTreeSet<PathBuf>,
    result: Vec<PathBuf>,
}

impl CandidateBuilder {
    fn push(&mut self, candidate: PathBuf) {
        if self.seen.insert(candidate.clone()) {
            self.result.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ResolveContext<'static> {
        ResolveContext {
            base_dir: Path::new("/project"),
            markup_dir: Path::new("/project/app/views"),
            search_root: Path::new("/project/app"),
        }
    }

    #[test]
    fn returns_empty_for_blank_paths() {
        assert!(generate_asset_candidates(&context(), &[], "").is_empty());
        assert!(generate_asset_candidates(&context(), &[], "/").is_empty());
    }

    #[test]
    fn tries_markup_dir_then_alternates_then_search_root() {
        let alternates = vec![".tmp".to_string()];
        let candidates = generate_asset_candidates(&context(), &alternates, "scripts/a.js?v=1");
        assert_eq!(candidates, vec![
            PathBuf::from("/project/app/views/scripts/a.js"),
            PathBuf::from("/project/.tmp/scripts/a.js"),
            PathBuf::from("/project/app/scripts/a.js"),
        ]);
    }

    #[test]
    fn rooted_references_skip_markup_dir() {
        let candidates = generate_asset_candidates(&context(), &[], "/styles/main.css");
        assert_eq!(candidates, vec![PathBuf::from("/project/app/styles/main.css")]);
    }

    #[test]
    fn deduplicates_identical_roots() {
        let alternates = vec!["app".to_string()];
        let candidates = generate_asset_candidates(&context(), &alternates, "/a.js");
        assert_eq!(candidates, vec![PathBuf::from("/project/app/a.js")]);
    }
}
