//! Naming rules for materialized images and on-disk path segments.
//!
//! Covers URL normalization for relative asset paths, file extension
//! resolution, the fallback stem for unmatched result indices, and
//! validation of names that are joined onto the data root.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Origin prepended to result URLs that arrive without a scheme.
pub const DEFAULT_ASSET_ORIGIN: &str = "https://res.theact.ai/";

/// Extension used when the URL's final path segment carries none.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Stem prefix for deliveries whose index has no matching scene.
pub const FALLBACK_STEM_PREFIX: &str = "original-image_";

/// File extensions listed as images by the browse API.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

// ---------------------------------------------------------------------------
// URL handling
// ---------------------------------------------------------------------------

/// Prefix `url` with `origin` unless it already has an `http://` or
/// `https://` scheme.
///
/// ```
/// use scenegen_core::naming::normalize_url;
///
/// assert_eq!(normalize_url("https://cdn/a.png", "https://res/"), "https://cdn/a.png");
/// assert_eq!(normalize_url("img/a.png", "https://res/"), "https://res/img/a.png");
/// assert_eq!(normalize_url("/img/a.png", "https://res"), "https://res/img/a.png");
/// ```
pub fn normalize_url(url: &str, origin: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// Resolve the file extension (with leading dot) for a result URL.
///
/// Query string and fragment are stripped, then the suffix after the last
/// `.` of the final path segment is used. Falls back to
/// [`DEFAULT_EXTENSION`] when there is no usable suffix.
pub fn resolve_extension(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.split_once("://") {
        // A bare host ("https://host.ai") has no path segment to inspect.
        Some((_, rest)) => match rest.split_once('/') {
            Some((_, path)) => path,
            None => return DEFAULT_EXTENSION.to_string(),
        },
        None => without_query,
    };
    let segment = path.rsplit('/').next().unwrap_or_default();

    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{ext}"),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stems and path segments
// ---------------------------------------------------------------------------

/// Stem for a delivery whose index does not address a submitted scene.
pub fn fallback_stem(index: i64) -> String {
    format!("{FALLBACK_STEM_PREFIX}{index}")
}

/// Replace path separators so a scene name always names a file inside
/// the task directory.
pub fn sanitize_stem(stem: &str) -> String {
    stem.replace(['/', '\\'], "_")
}

/// File name an image is written under: the sanitized stem plus the
/// extension resolved from `url`.
pub fn image_file_name(stem: &str, url: &str) -> String {
    format!("{}{}", sanitize_stem(stem), resolve_extension(url))
}

/// Whether `name` can be joined onto a directory as a single child entry.
///
/// Rejects empty names, `.`/`..`, and anything containing a path separator
/// or NUL byte.
pub fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Whether `file_name` has one of the [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
