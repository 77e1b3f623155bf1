/// Derive a stable category id from a display title.
///
/// Lowercases and trims the title, turns whitespace runs into single
/// hyphens, drops anything outside `[a-z0-9-_]`, and collapses repeated
/// hyphens. May produce an empty string for titles with no usable
/// characters; callers treat that as a validation failure.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if c == '-' && !slug.ends_with('-') {
            slug.push('-');
        }
        // Anything else is dropped.
    }

    slug
}
