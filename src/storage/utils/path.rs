// Path helper utilities shared across storage operations

/// Split a remote path into its non-empty segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collapse repeated slashes and strip the leading one. A trailing slash is kept.
pub fn normalize(path: &str) -> String {
    let joined = segments(path).join("/");
    if path.ends_with('/') && !joined.is_empty() {
        format!("{joined}/")
    } else {
        joined
    }
}

/// Build a remote path by joining base and file name.
pub fn build_remote_path(base: &str, file_name: &str) -> String {
    normalize(&format!("{base}/{file_name}"))
}

/// Extract a normalized basename from a remote path.
pub fn basename(path: &str) -> String {
    segments(path).last().map(|s| s.to_string()).unwrap_or_default()
}

/// Parent of a remote path, without slashes at either end. Root yields "".
pub fn parent(path: &str) -> String {
    let segs = segments(path);
    match segs.split_last() {
        Some((_, dirs)) => dirs.join("/"),
        None => String::new(),
    }
}

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Key under which a directory is addressed by the operator: "" for root, else "a/b/".
pub fn dir_key(path: &str) -> String {
    let trimmed = segments(path).join("/");
    if trimmed.is_empty() {
        trimmed
    } else {
        ensure_trailing_slash(&trimmed)
    }
}

/// Path handed to listing calls; root is spelled "/".
pub fn listing_root(path: &str) -> String {
    let key = dir_key(path);
    if key.is_empty() { "/".to_string() } else { key }
}

/// File key with leading and duplicated slashes removed.
pub fn file_key(path: &str) -> String {
    segments(path).join("/")
}
