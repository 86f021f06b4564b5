//! Slash-delimited document paths.
//!
//! Paths arriving from the change stream are root-relative and
//! slash-delimited (`/users/0/name`); the root itself is `/`.

/// Normalize a path to exactly one leading slash and no trailing slash.
pub fn normalize(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Split a path into its segments.
///
/// The root path (`/` or empty) yields a single empty segment, which
/// classifies as the root of the target graph.
pub fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// The last segment of a path, empty for the root path.
pub fn last_segment(path: &str) -> &str {
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}
