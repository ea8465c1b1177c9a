use mongodb::bson::{self, Bson, DateTime, Document};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::database::error::StoreError;
use crate::database::identity::slugify;

/// Body of `POST /api/portfolios`. Fields other than the known ones are
/// stored as given.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortfolioInput {
    /// Build the stored document. The slug is derived from the title and any
    /// client-supplied `_id` or `slug` is ignored.
    pub fn into_document(self, now: DateTime) -> Result<Document, StoreError> {
        let mut document = Document::new();
        for (key, value) in self.extra {
            if matches!(key.as_str(), "_id" | "slug" | "createdAt" | "updatedAt") {
                continue;
            }
            check_field_name(&key)?;
            document.insert(key, bson::to_bson(&value)?);
        }

        document.insert("slug", slugify(&self.title));
        document.insert("title", self.title);
        document.insert("description", self.description);
        document.insert("images", self.images);
        document.insert("technologies", self.technologies);
        document.insert("createdAt", Bson::DateTime(now));
        document.insert("updatedAt", Bson::DateTime(now));
        Ok(document)
    }
}

/// Turn an update body into a `$set` document. `_id` is dropped so the
/// primary key can never change; the slug is left as the client sent it.
pub fn update_fields(body: Map<String, Value>, now: DateTime) -> Result<Document, StoreError> {
    let mut fields = Document::new();
    for (key, value) in body {
        if matches!(key.as_str(), "_id" | "createdAt" | "updatedAt") {
            continue;
        }
        check_field_name(&key)?;
        fields.insert(key, bson::to_bson(&value)?);
    }
    fields.insert("updatedAt", Bson::DateTime(now));
    Ok(fields)
}

/// Operator-like (`$set`) and dotted (`a.b`) names would be read as update
/// operators or paths, not stored as fields.
fn check_field_name(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.starts_with('$') || key.contains('.') {
        return Err(StoreError::Invalid(format!("invalid field name '{}'", key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn create_derives_slug_and_ignores_client_keys() {
        let input: PortfolioInput = serde_json::from_value(json!({
            "title": "My Cool Project",
            "_id": "507f1f77bcf86cd799439011",
            "slug": "hand-written",
            "technologies": ["rust", "axum"],
            "link": "https://example.com"
        }))
        .unwrap();

        let doc = input.into_document(DateTime::from_millis(0)).unwrap();
        assert_eq!(doc.get_str("slug").unwrap(), "my_cool_project");
        assert_eq!(doc.get_str("title").unwrap(), "My Cool Project");
        assert_eq!(doc.get_str("link").unwrap(), "https://example.com");
        assert_eq!(doc.get_str("description").unwrap(), "");
        assert!(doc.get("_id").is_none());
        assert_eq!(doc.get_array("technologies").unwrap().len(), 2);
    }

    #[test]
    fn create_requires_title() {
        let result = serde_json::from_value::<PortfolioInput>(json!({ "description": "untitled" }));
        assert!(result.is_err());
    }

    #[test]
    fn update_never_touches_primary_key() {
        let now = DateTime::from_millis(1_700_000_000_000);
        let fields = update_fields(
            object(json!({ "_id": "ffffffffffffffffffffffff", "title": "Renamed" })),
            now,
        )
        .unwrap();

        assert!(fields.get("_id").is_none());
        assert_eq!(fields.get_str("title").unwrap(), "Renamed");
        assert!(fields.get("slug").is_none(), "slug is not recomputed on update");
        assert_eq!(fields.get_datetime("updatedAt").unwrap(), &now);
    }

    #[test]
    fn empty_update_only_stamps_time() {
        let fields = update_fields(Map::new(), DateTime::from_millis(5)).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("updatedAt"));
    }

    #[test]
    fn operator_and_dotted_names_are_rejected() {
        let now = DateTime::from_millis(0);
        for body in [
            json!({ "$where": "sleep(1000)" }),
            json!({ "owner.name": "someone" }),
            json!({ "title": "Fine", "$inc": { "views": 1 } }),
        ] {
            assert!(matches!(update_fields(object(body), now), Err(StoreError::Invalid(_))));
        }

        let input: PortfolioInput =
            serde_json::from_value(json!({ "title": "Site", "stats.views": 3 })).unwrap();
        assert!(matches!(input.into_document(now), Err(StoreError::Invalid(_))));
    }
}
