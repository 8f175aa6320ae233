use crate::article::Article;

/// Literal some upstream feeds emit when they serialize a missing field.
pub const NULL_SENTINEL: &str = "null";

const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];
const IMAGE_KEYWORDS: [&str; 5] = ["image", "img", "photo", "picture", "media"];

/// Picks the best image candidate for an article without touching the network.
///
/// Order: a previously resolved URL, then `urlToImage`, then `image`. Field
/// values are returned exactly as given. Empty strings and the `"null"`
/// literal count as absent, which also covers the final non-empty re-check of
/// `urlToImage`. Returns `None` when nothing is usable, in which case the
/// caller falls through to a placeholder.
pub fn select_candidate(article: &Article, previous: Option<&str>) -> Option<String> {
    if let Some(previous) = previous.filter(|p| !p.is_empty()) {
        return Some(previous.to_string());
    }

    present(article.url_to_image.as_deref())
        .or_else(|| present(article.image.as_deref()))
        .map(str::to_string)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != NULL_SENTINEL)
}

/// Cheap plausibility check run before a URL is worth a network probe.
pub fn is_valid_image_url(url: &str) -> bool {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return false;
    }

    let lower = url.to_lowercase();
    let has_extension = IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext));
    let has_keyword = IMAGE_KEYWORDS.iter().any(|kw| lower.contains(kw));

    has_extension || has_keyword || url.len() > 10
}
