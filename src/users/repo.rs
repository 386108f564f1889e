use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::repo_types::{NewUser, User};
use crate::error::{ApiError, ApiResult};

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>>;

    async fn list(&self) -> ApiResult<Vec<User>>;

    /// Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, new: NewUser) -> ApiResult<User>;

    /// Writes back a mutated record and bumps `updated_at`.
    async fn save(&self, user: User) -> ApiResult<User>;

    /// Returns `false` when nothing was removed.
    async fn delete(&self, id: &ObjectId) -> ApiResult<bool>;
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }

    /// Unique index backing the email invariant.
    pub async fn ensure_indexes(&self) -> ApiResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ApiResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, new), fields(email = %new.email))]
    async fn create(&self, new: NewUser) -> ApiResult<User> {
        let user = User::from_new(new);
        self.collection.insert_one(&user).await?;
        info!(user_id = %user.id, "user document inserted");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save(&self, mut user: User) -> ApiResult<User> {
        user.updated_at = DateTime::now();
        let result = self
            .collection
            .replace_one(doc! { "_id": user.id }, &user)
            .await?;
        if result.matched_count == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> ApiResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Process-local store with the same uniqueness rules as the Mongo one.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &ObjectId) -> ApiResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> ApiResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        // ObjectIds start with a timestamp, so this is insertion order
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn create(&self, new: NewUser) -> ApiResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(ApiError::DuplicateEmail);
        }
        let user = User::from_new(new);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, mut user: User) -> ApiResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(ApiError::NotFound);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(ApiError::DuplicateEmail);
        }
        user.updated_at = DateTime::now();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &ObjectId) -> ApiResult<bool> {
        Ok(self.users.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            mobile_no: "5550100".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("jane@example.com")).await.unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.created_at, user.updated_at);
        let found = store.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.create(new_user("jane@example.com")).await.unwrap();
        let err = store.create(new_user("jane@example.com")).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[tokio::test]
    async fn save_rejects_email_owned_by_someone_else() {
        let store = InMemoryUserStore::new();
        store.create(new_user("a@example.com")).await.unwrap();
        let mut b = store.create(new_user("b@example.com")).await.unwrap();
        b.email = "a@example.com".into();
        let err = store.save(b).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[tokio::test]
    async fn save_of_removed_record_is_not_found() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("gone@example.com")).await.unwrap();
        assert!(store.delete(&user.id).await.unwrap());
        assert!(!store.delete(&user.id).await.unwrap());
        assert!(matches!(store.save(user).await, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn list_returns_everyone() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("a@example.com")).await.unwrap();
        let b = store.create(new_user("b@example.com")).await.unwrap();
        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB at MONGO_URI
    async fn mongo_store_enforces_unique_email() {
        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let db = client.database("accounts_api_test");
        let store = MongoUserStore::new(&db);
        store.ensure_indexes().await.unwrap();

        let email = format!("{}@example.com", ObjectId::new().to_hex());
        let user = store.create(new_user(&email)).await.unwrap();
        let err = store.create(new_user(&email)).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
        assert!(store.delete(&user.id).await.unwrap());
    }
}
