//! Internal path normalization
//!
//! Index paths are stored with forward slashes and no leading separator.
//! Patch payloads built on Windows frequently carry backslashes or a `./`
//! prefix, so every lookup key goes through [`normalize_path`] first.

/// Normalize an internal archive path
///
/// Converts backslashes to forward slashes, drops empty and `.` segments
/// (which removes leading, trailing and repeated separators), and keeps
/// everything else verbatim. Lookups are case-sensitive.
///
/// # Examples
///
/// ```
/// use ggpk_index::path::normalize_path;
///
/// assert_eq!(normalize_path("art\\icon.png"), "art/icon.png");
/// assert_eq!(normalize_path("/art//ui/./x.dds"), "art/ui/x.dds");
/// assert_eq!(normalize_path("data/"), "data");
/// ```
pub fn normalize_path(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Last component of a normalized path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Check that a normalized path stays inside its root when joined to a directory
pub fn is_contained(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(|segment| segment != "..")
}
