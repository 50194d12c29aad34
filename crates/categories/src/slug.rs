//! URL slugs derived from category names

/// Turn a display name into a URL slug.
///
/// ASCII letters and digits are kept (lowercased), runs of whitespace or
/// hyphens collapse to a single `-`, and everything else is dropped.
///
/// ```
/// use storefront_categories::generate_slug;
///
/// assert_eq!(generate_slug("Men's Shoes & Boots"), "mens-shoes-boots");
/// ```
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

/// Whether `slug` is already in canonical form
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && generate_slug(slug) == slug
}
