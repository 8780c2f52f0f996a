//! User records kept in the document store.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A user exactly as stored in the `usuarios` collection.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
}

/// A user as returned to clients; `_id` is the ObjectId in hex.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Body of `POST /usuarios`.
#[derive(Deserialize, Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Body of `PUT /usuarios/{id}`. Absent fields are left untouched.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            name: doc.name,
            email: doc.email,
        }
    }
}
