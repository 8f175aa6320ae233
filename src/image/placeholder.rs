use chrono::Utc;
use md5::{Digest, Md5};
use serde::Serialize;
use uuid::Uuid;

use crate::article::Article;

pub const PLACEHOLDER_BASE: &str = "https://picsum.photos/400/250";

pub const DEFAULT_CATEGORY: &str = "general";

const CATEGORY_COLORS: [(&str, &str); 7] = [
    ("cybersecurity", "1e40af"),
    ("technology", "059669"),
    ("business", "7c2d12"),
    ("politics", "581c87"),
    ("science", "1e293b"),
    ("health", "be185d"),
    ("general", "374151"),
];

// Checked in order; "security" must win over "tech" for "Tech security" titles.
const TITLE_KEYWORDS: [(&[&str], &str); 6] = [
    (&["cybersecurity", "security"], "cybersecurity"),
    (&["technology", "tech"], "technology"),
    (&["business"], "business"),
    (&["politics"], "politics"),
    (&["science"], "science"),
    (&["health"], "health"),
];

/// Badge color and label a renderer can draw over a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub color: &'static str,
    pub label: String,
}

impl CategoryStyle {
    pub fn for_category(category: &str) -> Self {
        let color = CATEGORY_COLORS
            .iter()
            .find(|(name, _)| *name == category)
            .or_else(|| CATEGORY_COLORS.iter().find(|(name, _)| *name == DEFAULT_CATEGORY))
            .map(|(_, color)| *color)
            .unwrap_or("374151");

        Self {
            color,
            label: capitalize(category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub url: String,
    #[serde(flatten)]
    pub style: CategoryStyle,
}

impl Placeholder {
    pub fn new(category: Option<&str>, seed: &str) -> Self {
        let category = category.filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CATEGORY);
        Self {
            url: placeholder_url(seed),
            style: CategoryStyle::for_category(category),
        }
    }

    pub fn for_article(article: &Article) -> Self {
        Self::new(Some(article_category(article)), &placeholder_seed(article))
    }
}

/// The article's own category, else one guessed from title keywords, else
/// `general`.
pub fn article_category(article: &Article) -> &str {
    if let Some(category) = article.category.as_deref().filter(|c| !c.is_empty()) {
        return category;
    }

    let title = article.title.as_deref().unwrap_or("").to_lowercase();
    TITLE_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| title.contains(*kw)))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

pub fn placeholder_url(seed: &str) -> String {
    format!("{PLACEHOLDER_BASE}?random={}", urlencoding::encode(seed))
}

/// Identity used to vary placeholders between articles: the article URL, then
/// its id or `_id`, then a digest of the title. Articles with none of these get
/// a one-off token, so their placeholder changes on every resolution.
pub fn placeholder_seed(article: &Article) -> String {
    if let Some(identity) = article.identity() {
        return identity.to_string();
    }

    match article.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => title_digest(title),
        None => format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        ),
    }
}

fn title_digest(title: &str) -> String {
    hex::encode(Md5::new().chain_update(title.as_bytes()).finalize())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
