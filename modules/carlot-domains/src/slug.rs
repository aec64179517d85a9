use deunicode::deunicode;

/// Derive a URL-safe slug from a display name: lowercase ASCII
/// alphanumerics separated by single hyphens. Accented letters are
/// transliterated first ("Škoda" becomes "skoda").
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '&' {
            if !slug.is_empty() {
                slug.push('-');
            }
            slug.push_str("and");
            pending_dash = true;
        } else {
            pending_dash = true;
        }
    }

    slug
}
