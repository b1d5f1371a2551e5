/// Derives a URL slug from a category name: lowercased, with every run of
/// whitespace replaced by a single hyphen.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Uses the supplied slug when present, otherwise derives one from the name.
pub fn slug_or_derive(slug: Option<&str>, name: &str) -> String {
    match slug {
        Some(slug) if !slug.trim().is_empty() => slug.to_string(),
        _ => slugify(name),
    }
}
