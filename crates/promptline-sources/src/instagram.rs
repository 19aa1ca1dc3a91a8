//! Instagram post records as delivered by the report webhook.
//!
//! Source keys are Spanish column names exported from a spreadsheet and
//! usually carry a leading space (`" Cantidad de Likes"`). Both the trimmed
//! and the untrimmed spelling are accepted.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SourceError;

const USERNAME: &str = "Username";
const LIKES: &str = "Cantidad de Likes";
const COMMENTS: &str = "Cantidad de Comentarios";
const CAPTION: &str = "Primer Comentario";
const HASHTAGS: &str = "Hashtags";
const MENTIONS: &str = "Menciones";
const PUBLISHED_AT: &str = "Fecha de Publicación";
const POST_URL: &str = "URL del Post";
const IMAGE_URL: &str = "Imagen URL";
const IS_AD: &str = "Es Publicidad";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub username: String,
    pub likes: u64,
    pub comments: u64,
    pub caption: String,
    pub hashtags: String,
    pub mentions: String,
    pub published_at: String,
    pub url: String,
    pub image_url: Option<String>,
    pub is_ad: bool,
}

impl PostRecord {
    pub fn from_source(record: &Map<String, Value>) -> Self {
        let field = |name: &str| -> Option<&Value> {
            record
                .get(name)
                .or_else(|| record.get(&format!(" {}", name)))
                .or_else(|| record.iter().find(|(k, _)| k.trim() == name).map(|(_, v)| v))
        };
        let text = |name: &str| field(name).map(text_of).unwrap_or_default();

        Self {
            username: text(USERNAME),
            likes: field(LIKES).map(count_of).unwrap_or(0),
            comments: field(COMMENTS).map(count_of).unwrap_or(0),
            caption: text(CAPTION),
            hashtags: text(HASHTAGS),
            mentions: text(MENTIONS),
            published_at: text(PUBLISHED_AT),
            url: text(POST_URL),
            image_url: field(IMAGE_URL).map(text_of).and_then(|s| image_formula_url(&s)),
            is_ad: field(IS_AD).map(flag_of).unwrap_or(false),
        }
    }
}

/// Normalise a webhook body. It must be a non-empty array of objects.
pub fn parse_posts(body: &Value) -> Result<Vec<PostRecord>, SourceError> {
    let records = body
        .as_array()
        .ok_or_else(|| SourceError::Malformed("report is not a list of records".to_string()))?;
    if records.is_empty() {
        return Err(SourceError::Malformed("report contains no records".to_string()));
    }

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .as_object()
                .map(PostRecord::from_source)
                .ok_or_else(|| SourceError::Malformed(format!("record {} is not an object", i)))
        })
        .collect()
}

/// Headline metrics shown above a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub posts: usize,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

impl PostSummary {
    pub fn of(posts: &[PostRecord]) -> Self {
        let total_likes: u64 = posts.iter().map(|p| p.likes).sum();
        let total_comments: u64 = posts.iter().map(|p| p.comments).sum();
        let n = posts.len().max(1) as f64;
        Self {
            posts: posts.len(),
            total_likes,
            total_comments,
            avg_likes: total_likes as f64 / n,
            avg_comments: total_comments as f64 / n,
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Counts arrive as numbers or as text like `"1,204"`.
fn count_of(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

fn flag_of(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "si" | "sí" | "verdadero"
        ),
        _ => false,
    }
}

/// Image cells hold a spreadsheet formula, `IMAGE("https://...")`, or a bare URL.
fn image_formula_url(cell: &str) -> Option<String> {
    let cell = cell.trim().trim_start_matches('=');
    if let Some(rest) = cell.strip_prefix("IMAGE(\"") {
        return rest.split('"').next().filter(|u| !u.is_empty()).map(str::to_string);
    }
    cell.starts_with("http").then(|| cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leading_space_keys() {
        let body = json!([{
            " Username": "acme",
            " Cantidad de Likes": 120,
            " Cantidad de Comentarios": "1,204",
            " Primer Comentario": " New drop! ",
            " Hashtags": "#soap #handmade",
            " Fecha de Publicación": "2024-05-01T10:00:00",
            " URL del Post": "https://instagram.com/p/abc",
            " Imagen URL": "=IMAGE(\"https://cdn.example/img.jpg\")",
            " Es Publicidad": "FALSE"
        }]);
        let posts = parse_posts(&body).unwrap();
        let post = &posts[0];
        assert_eq!(post.username, "acme");
        assert_eq!(post.likes, 120);
        assert_eq!(post.comments, 1204);
        assert_eq!(post.caption, "New drop!");
        assert_eq!(post.url, "https://instagram.com/p/abc");
        assert!(!post.is_ad);
        assert_eq!(post.mentions, "");
    }

    #[test]
    fn test_trimmed_keys_and_image_formula() {
        let record = json!({
            "Cantidad de Likes": 3.0,
            "Imagen URL": "IMAGE(\"https://cdn.example/a.png\")",
            "Es Publicidad": true
        });
        let post = PostRecord::from_source(record.as_object().unwrap());
        assert_eq!(post.likes, 3);
        assert_eq!(post.image_url.as_deref(), Some("https://cdn.example/a.png"));
        assert!(post.is_ad);
    }

    #[test]
    fn test_body_must_be_non_empty_list() {
        assert!(parse_posts(&json!([])).is_err());
        assert!(parse_posts(&json!({ "posts": [] })).is_err());
        assert!(parse_posts(&json!([1])).is_err());
    }

    #[test]
    fn test_summary() {
        let posts = vec![
            PostRecord { likes: 10, comments: 1, ..Default::default() },
            PostRecord { likes: 20, comments: 3, ..Default::default() },
        ];
        let summary = PostSummary::of(&posts);
        assert_eq!(summary.total_likes, 30);
        assert_eq!(summary.avg_comments, 2.0);
        assert_eq!(PostSummary::of(&[]).avg_likes, 0.0);
    }
}
