use mongodb::bson::{self, Bson, Document};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Convert a stored BSON value into the public JSON shape.
///
/// ObjectIds become their 24-char hex string and dates become RFC 3339
/// strings, so clients never see `{"$oid": ...}` or `{"$date": ...}`.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => json!(dt.timestamp_millis()),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Int32(n) => json!(n),
        Bson::Int64(n) => json!(n),
        Bson::Double(n) => json!(n),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc.into_iter().map(|(k, v)| (k, bson_to_json(v))).collect();
    Value::Object(map)
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

/// Serialize a typed model through BSON so its ids and dates get the same
/// treatment as raw documents.
pub fn to_api_value<T: Serialize>(model: &T) -> Result<Value, bson::ser::Error> {
    Ok(bson_to_json(bson::to_bson(model)?))
}

pub fn to_api_values<T: Serialize>(models: &[T]) -> Result<Value, bson::ser::Error> {
    let values = models.iter().map(to_api_value).collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(values))
}
