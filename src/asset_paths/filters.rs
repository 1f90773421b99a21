use regex::Regex;

fn asset_reference_ignores() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a reference inside a build block points outside the project.
///
/// Remote URLs and data URIs cannot be concatenated into a bundle, so they are dropped
/// from the block without being reported as missing.
pub fn should_ignore_asset_reference(value: &str) -> bool {
    asset_reference_ignores()
        .iter()
        .any(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::should_ignore_asset_reference;

    #[test]
    fn ignores_http_urls() {
        assert!(should_ignore_asset_reference("https://cdn.example.com/jquery.js"));
        assert!(should_ignore_asset_reference("HTTP://example.com/a.css"));
    }

    #[test]
    fn ignores_protocol_relative_urls() {
        assert!(should_ignore_asset_reference("//cdn.example.com/lib.js"));
    }

    #[test]
    fn ignores_data_uris() {
        assert!(should_ignore_asset_reference("data:text/javascript,void(0)"));
    }

    #[test]
    fn keeps_project_paths() {
        assert!(!should_ignore_asset_reference("scripts/main.js"));
        assert!(!should_ignore_asset_reference("/styles/main.css"));
    }
}
