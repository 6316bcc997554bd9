//! Unified diffs for `merge --dryRun`.

use std::path::Path;

use similar::TextDiff;

/// Unified diff from `existing` to `updated`, with `a/` and `b/` headers
/// naming `path` relative to `base`.
pub fn unified_diff(path: &Path, base: &Path, existing: &str, updated: &str) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    TextDiff::from_lines(existing, updated)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}
