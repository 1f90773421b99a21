/// Normalise a declared bundle path into its manifest key form.
///
/// The key always uses forward slashes and carries no leading `/` or `./`, so that the same
/// bundle declared as `/scripts/app.js` in one template and `scripts/app.js` in another maps
/// to a single manifest entry.
pub fn normalize_bundle_path(declared: &str) -> String {
    let forward = declared.trim().replace('\\', "/");
    let mut trimmed = forward.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Insert a fingerprint before the final extension of a bundle path.
///
/// `scripts/app.js` becomes `scripts/app.<hash>.js`; paths without an extension get the
/// fingerprint appended as a suffix.
pub fn fingerprinted_path(path: &str, fingerprint: &str) -> String {
    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, file_name)) => (Some(dir), file_name),
        None => (None, path),
    };

    let renamed = match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{stem}.{fingerprint}.{extension}"),
        _ => format!("{file_name}.{fingerprint}"),
    };

    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed,
    }
}
