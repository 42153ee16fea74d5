use unicode_normalization::UnicodeNormalization;

/// Fixed namespace every stored blob lives under.
pub const BLOB_NAMESPACE: &str = "reports_files/public";

/// Produces a safe object key from an uploaded file name.
///
/// The name is NFKD-normalized, runs of whitespace and commas collapse
/// to a single underscore, anything outside `[A-Za-z0-9_.-]` is
/// stripped, and the result is percent-encoded.
#[must_use]
pub fn object_key(file_name: &str) -> String {
    urlencoding::encode(&sanitize_file_name(file_name)).into_owned()
}

#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let normalized: String = file_name.nfkd().collect();
    let mut sanitized = String::with_capacity(normalized.len());
    let mut in_separator = false;
    for c in normalized.chars() {
        if c.is_whitespace() || c == ',' {
            if !in_separator {
                sanitized.push('_');
                in_separator = true;
            }
            continue;
        }
        in_separator = false;
        if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
            sanitized.push(c);
        }
    }
    sanitized
}

#[must_use]
pub fn file_url(key: &str) -> String {
    format!("/{BLOB_NAMESPACE}/{key}")
}

/// Recovers the object key from a stored file URL.
#[must_use]
pub fn key_from_url(url: &str) -> Option<&str> {
    url.split("/public/").nth(1)
}
