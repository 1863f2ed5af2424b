//! Artifact file naming.

/// Name used when a title has no usable characters.
const FALLBACK_NAME: &str = "untitled";

/// Derive the artifact base name for a chapter title.
///
/// Lowercases the title and collapses every run of non-alphanumeric
/// characters into a single `-`, so "Chapter 4: The Storm" becomes
/// "chapter-4-the-storm". Callers predicting output paths must use this
/// function rather than re-deriving names themselves.
pub fn derive_base_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !name.is_empty() {
                name.push('-');
            }
            pending_dash = false;
            name.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}
