use std::collections::HashSet;

/// Trim every tag, drop blank ones and remove exact duplicates.
///
/// First occurrence wins, so the relative order of the surviving tags is kept.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Split a comma-separated tag cell such as `"keto, Health Summit,"`.
pub fn split_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
