use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// User document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String, // argon2 PHC string
    pub mobile_no: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Fields supplied at registration; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: String,
}

impl User {
    pub fn from_new(new: NewUser) -> Self {
        let now = DateTime::now();
        Self {
            id: ObjectId::new(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            mobile_no: new.mobile_no,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}
