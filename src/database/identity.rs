use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

/// How a `/api/portfolios/:id` path segment addresses a portfolio item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortfolioKey {
    /// 24 hex characters, looked up by `_id`
    ObjectId(ObjectId),
    /// All digits: legacy numeric `id` (stored as number or string), then slug
    Numeric(String),
    Slug(String),
}

impl PortfolioKey {
    pub fn classify(segment: &str) -> Self {
        if is_object_id(segment) {
            if let Ok(oid) = ObjectId::parse_str(segment) {
                return PortfolioKey::ObjectId(oid);
            }
        }
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            return PortfolioKey::Numeric(segment.to_string());
        }
        PortfolioKey::Slug(segment.to_string())
    }

    /// Lookup filters in precedence order. A numeric key matches the legacy
    /// id first and only falls back to a slug equal to the digits when no
    /// legacy id matches.
    pub fn candidate_filters(&self) -> Vec<Document> {
        match self {
            PortfolioKey::ObjectId(oid) => vec![doc! { "_id": *oid }],
            PortfolioKey::Numeric(digits) => {
                let mut legacy = Vec::with_capacity(2);
                if let Ok(n) = digits.parse::<i64>() {
                    legacy.push(doc! { "id": Bson::Int64(n) });
                }
                legacy.push(doc! { "id": digits.as_str() });
                vec![doc! { "$or": legacy }, doc! { "slug": digits.as_str() }]
            }
            PortfolioKey::Slug(slug) => vec![doc! { "slug": slug.as_str() }],
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            PortfolioKey::ObjectId(oid) => oid.to_hex(),
            PortfolioKey::Numeric(s) | PortfolioKey::Slug(s) => s.clone(),
        }
    }
}

fn is_object_id(segment: &str) -> bool {
    segment.len() == 24 && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercase the title and collapse each whitespace run into `_`
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
