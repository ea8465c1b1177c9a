use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub upvotes: i32,
    /// External identity ids that already voted; `upvotes` mirrors its length
    #[serde(default)]
    pub upvote_ids: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Article {
    pub fn seed(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            upvotes: 0,
            upvote_ids: Vec::new(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub text: String,
}
