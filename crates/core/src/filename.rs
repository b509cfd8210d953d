/// Longest accepted filename, in bytes.
const MAX_FILENAME_BYTES: usize = 255;

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ')
}

/// Sanitize a caller-supplied filename for storage and for use inside a
/// `Content-Disposition` header.
///
/// Path components are stripped (both separator styles), characters outside
/// `[A-Za-z0-9._ -]` are replaced with `_`, and the result is capped at 255
/// bytes on a character boundary. Returns `None` when nothing displayable
/// remains; an all-unsafe name is rejected rather than silently defaulted.
///
/// Sanitization is idempotent: sanitizing an already-sanitized name yields
/// the same name.
#[must_use]
pub fn sanitize_filename(raw: &str) -> Option<String> {
    // Keep only the final path segment.
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw);

    let mut out = String::with_capacity(base.len().min(MAX_FILENAME_BYTES));
    for c in base.chars() {
        let c = if is_safe_char(c) { c } else { '_' };
        if out.len() + c.len_utf8() > MAX_FILENAME_BYTES {
            break;
        }
        out.push(c);
    }

    // A name that reduces to nothing but replacement noise is not a name.
    if out.trim_matches(['_', '.', ' ']).is_empty() {
        return None;
    }

    Some(out)
}
