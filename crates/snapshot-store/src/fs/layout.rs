use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::ArtifactKind;

/// Normalise a human description into a file-name slug.
///
/// Lowercases and collapses every run of non-alphanumerics into one `-`.
pub fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("artifact");
    }
    out
}

/// `{root}/{slug}-{%Y%m%dT%H%M%S%3f}-{8 hex}.{ext}`
pub fn artifact_path(root: &Path, slug: &str, kind: ArtifactKind, ts: DateTime<Utc>) -> PathBuf {
    let nonce = Uuid::new_v4().simple().to_string();
    root.join(format!(
        "{}-{}-{}.{}",
        slugify(slug),
        ts.format("%Y%m%dT%H%M%S%3f"),
        &nonce[..8],
        kind.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("Color Options (debug)"), "color-options-debug");
        assert_eq!(slugify("  product_title--debug "), "product-title-debug");
        assert_eq!(slugify("???"), "artifact");
    }

    #[test]
    fn paths_are_distinct_for_the_same_instant() {
        let ts = Utc::now();
        let a = artifact_path(Path::new("out"), "cart", ArtifactKind::Screenshot, ts);
        let b = artifact_path(Path::new("out"), "cart", ArtifactKind::Screenshot, ts);
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("cart-"));
        assert!(name.ends_with(".png"));
    }
}
