use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

const IMAGE_FIELD_KEYWORDS: [&str; 4] = ["image", "img", "photo", "media"];

/// News article metadata as delivered by the backend. Only the fields the
/// image pipeline reads are typed; everything else lands in `extra`.
///
/// Typed fields never reject a record: a value of the wrong JSON type reads
/// as absent, except numeric ids which are stringified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(
        rename = "urlToImage",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url_to_image: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Document id from Mongo-backed feeds, used when `id` is missing.
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub db_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

impl Article {
    pub fn with_url_to_image(url: impl Into<String>) -> Self {
        Self {
            url_to_image: Some(url.into()),
            ..Self::default()
        }
    }

    /// Reads one record from a feed. A record that is not a JSON object is
    /// logged and treated as an article without any fields.
    pub fn from_json(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Skipping fields of malformed article record: {}", e);
            Self::default()
        })
    }

    /// First non-empty of `url`, `id` and `_id`.
    pub fn identity(&self) -> Option<&str> {
        [&self.url, &self.id, &self.db_id]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .find(|value| !value.is_empty())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("<untitled>")
    }

    /// Every field whose name looks image related, paired with its value.
    /// Typed fields come first, then extra fields in key order.
    pub fn image_fields(&self) -> Vec<(String, Value)> {
        let typed = [
            ("urlToImage", &self.url_to_image),
            ("image", &self.image),
        ];

        let mut fields: Vec<(String, Value)> = typed
            .into_iter()
            .map(|(name, value)| {
                let value = value.clone().map(Value::String).unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect();

        let mut extra: Vec<_> = self
            .extra
            .iter()
            .filter(|(key, _)| is_image_field_name(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        extra.sort_by(|a, b| a.0.cmp(&b.0));

        fields.extend(extra);
        fields
    }
}

fn is_image_field_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_FIELD_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}
