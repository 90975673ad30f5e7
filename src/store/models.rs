//! Catalog models
//!
//! Data structures representing catalog entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cartoon record in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cartoon {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub description: String,
    pub studio: String,
    pub genre: Genre,
    pub release_year: i64,
    /// Fields the catalog does not model; kept verbatim and sortable
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Genre of a cartoon, either one value or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Genre {
    Single(String),
    Many(Vec<String>),
}

impl Genre {
    /// Whether the cartoon belongs to the given genre (exact, case-sensitive)
    pub fn contains(&self, genre: &str) -> bool {
        match self {
            Genre::Single(value) => value == genre,
            Genre::Many(values) => values.iter().any(|value| value == genre),
        }
    }
}

impl From<&str> for Genre {
    fn from(value: &str) -> Self {
        Genre::Single(value.to_string())
    }
}

impl From<Vec<&str>> for Genre {
    fn from(values: Vec<&str>) -> Self {
        Genre::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// A field value as seen by the sort stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    /// Modelled integer fields, and extra fields holding an exact integer
    Integer(i64),
    Number(f64),
    /// Present, but neither text nor a number
    Other,
}

impl<'a> From<&'a Value> for FieldValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => FieldValue::Text(text),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => FieldValue::Integer(integer),
                None => number.as_f64().map_or(FieldValue::Other, FieldValue::Number),
            },
            _ => FieldValue::Other,
        }
    }
}

impl Cartoon {
    /// Resolve a field by its wire name; `None` when the record has no such field
    pub fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        let value = match key {
            "id" => FieldValue::Integer(self.id),
            "title" => FieldValue::Text(&self.title),
            "director" => FieldValue::Text(&self.director),
            "description" => FieldValue::Text(&self.description),
            "studio" => FieldValue::Text(&self.studio),
            "releaseYear" => FieldValue::Integer(self.release_year),
            "genre" => match &self.genre {
                Genre::Single(value) => FieldValue::Text(value),
                Genre::Many(_) => FieldValue::Other,
            },
            other => return self.extra.get(other).map(FieldValue::from),
        };
        Some(value)
    }

    /// Whether a textual identifier refers to this cartoon
    pub fn matches_id(&self, raw: &str) -> bool {
        parse_cartoon_id(raw) == Some(self.id)
    }
}

/// Canonical id coercion: trimmed text parsed as a signed integer.
///
/// `"7"`, `" 7 "` and `"07"` all name id 7; text that is not an integer names
/// no cartoon at all.
pub fn parse_cartoon_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Cartoon {
        serde_json::from_value(json!({
            "id": 7,
            "title": "Shrek",
            "director": "Andrew Adamson",
            "description": "An ogre sets out to rescue a princess.",
            "studio": "DreamWorks Animation",
            "genre": "comedy",
            "releaseYear": 2001,
            "rating": 7.9,
            "tagline": "The greatest fairy tale never told",
            "awards": ["Oscar"]
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_keeps_extra_fields() {
        let cartoon = sample();

        assert_eq!(cartoon.release_year, 2001);
        assert_eq!(cartoon.extra.len(), 3);
        assert_eq!(cartoon.extra["rating"], json!(7.9));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["releaseYear"], 2001);
        assert_eq!(value["genre"], "comedy");
        assert_eq!(value["tagline"], "The greatest fairy tale never told");
        assert!(value.get("release_year").is_none());
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn test_genre_single_and_many() {
        let single: Genre = serde_json::from_value(json!("comedy")).unwrap();
        let many: Genre = serde_json::from_value(json!(["adventure", "comedy"])).unwrap();

        assert_eq!(single, Genre::from("comedy"));
        assert!(single.contains("comedy"));
        assert!(!single.contains("Comedy"));
        assert!(many.contains("comedy"));
        assert!(many.contains("adventure"));
        assert!(!many.contains("drama"));

        assert_eq!(serde_json::to_value(&many).unwrap(), json!(["adventure", "comedy"]));
    }

    #[test]
    fn test_field_resolution() {
        let cartoon = sample();

        assert_eq!(cartoon.field("title"), Some(FieldValue::Text("Shrek")));
        assert_eq!(cartoon.field("releaseYear"), Some(FieldValue::Integer(2001)));
        assert_eq!(cartoon.field("id"), Some(FieldValue::Integer(7)));
        assert_eq!(cartoon.field("genre"), Some(FieldValue::Text("comedy")));
        assert_eq!(cartoon.field("rating"), Some(FieldValue::Number(7.9)));
        assert_eq!(cartoon.field("awards"), Some(FieldValue::Other));
        assert_eq!(cartoon.field("runtime"), None);
        // Wire names only
        assert_eq!(cartoon.field("release_year"), None);
    }

    #[test]
    fn test_genre_set_is_not_sortable() {
        let mut cartoon = sample();
        cartoon.genre = Genre::from(vec!["comedy", "adventure"]);

        assert_eq!(cartoon.field("genre"), Some(FieldValue::Other));
    }

    #[test]
    fn test_id_coercion() {
        let cartoon = sample();

        assert!(cartoon.matches_id("7"));
        assert!(cartoon.matches_id(" 7 "));
        assert!(cartoon.matches_id("07"));
        assert!(!cartoon.matches_id("8"));
        assert!(!cartoon.matches_id("7a"));
        assert!(!cartoon.matches_id(""));
        assert_eq!(parse_cartoon_id("-3"), Some(-3));
        assert_eq!(parse_cartoon_id("seven"), None);
    }
}
