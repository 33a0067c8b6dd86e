//! File name rules shared by uploads and the listing.

/// Prefix of identifiers synthesised for images without metadata.
pub const ORPHAN_ID_PREFIX: &str = "img-";

/// Accepted image extensions, lowercase, without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Stem used when sanitising leaves nothing usable.
const FALLBACK_STEM: &str = "image";

/// Whether the name ends in an accepted image extension (case-insensitive).
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    })
}

/// Make a client-supplied file name safe to store.
///
/// Whitespace runs become `-`, every character outside `[A-Za-z0-9._-]` is
/// dropped, and an empty stem is replaced so the result is never hidden or
/// extension-only.
#[must_use]
pub fn sanitize_filename(original: &str) -> String {
    let mut cleaned = String::with_capacity(original.len());
    let mut in_whitespace = false;
    for ch in original.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                cleaned.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            cleaned.push(ch);
        }
    }
    let (stem, ext) = match cleaned.rfind('.') {
        Some(index) => cleaned.split_at(index),
        None => (cleaned.as_str(), ""),
    };
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        format!("{FALLBACK_STEM}{ext}")
    } else {
        format!("{stem}{ext}")
    }
}

/// Split `name` into stem and extension (with its dot). Leading-dot names
/// such as `.png` have no extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(index) => name.split_at(index),
    }
}

/// Title shown for an image without metadata: the name without its last
/// extension, with `-` and `_` turned into spaces.
#[must_use]
pub fn default_title(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(index) if index + 1 < filename.len() => &filename[..index],
        _ => filename,
    };
    stem.replace(['-', '_'], " ")
}

/// Identifier synthesised for an image without metadata.
#[must_use]
pub fn orphan_id(filename: &str) -> String {
    format!("{ORPHAN_ID_PREFIX}{filename}")
}

/// A bare file name that resolves inside its directory: no separators, not
/// empty, not `.`/`..`.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Keep at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
