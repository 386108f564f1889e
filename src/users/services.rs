use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AdminUpdateRequest, AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest,
        UserDetail, UserRecord, UserSummary,
    },
    repo::UserStore,
    repo_types::{NewUser, User},
};
use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_off_thread, verify_off_thread},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Empty strings count as "not supplied".
fn merge(incoming: Option<String>, current: String) -> String {
    incoming.filter(|v| !v.is_empty()).unwrap_or(current)
}

/// Unparseable ids can never match a record.
pub(crate) fn parse_id(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::NotFound)
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone(), state.keys.clone())
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    fn issue(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self.keys.sign(&user.id)?;
        Ok(AuthResponse {
            user: UserSummary::from(user),
            token,
        })
    }

    async fn load(&self, id: &ObjectId) -> ApiResult<User> {
        self.store.find_by_id(id).await?.ok_or(ApiError::NotFound)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn authenticate(&self, req: LoginRequest) -> ApiResult<AuthResponse> {
        let email = normalize_email(&req.email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_off_thread(req.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.issue(&user)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<AuthResponse> {
        let email = normalize_email(&req.email);

        if !email.is_empty() && self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(ApiError::DuplicateEmail);
        }

        let name = req.name.trim().to_string();
        let mobile_no = req.mobile_no.trim().to_string();
        if name.is_empty() || mobile_no.is_empty() || req.password.is_empty() || !is_valid_email(&email)
        {
            warn!(email = %email, "invalid registration data");
            return Err(ApiError::InvalidInput("Invalid user data".into()));
        }

        let password_hash = hash_off_thread(req.password).await?;
        let user = self
            .store
            .create(NewUser {
                name,
                email,
                password_hash,
                mobile_no,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        self.issue(&user)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, caller: &ObjectId) -> ApiResult<UserSummary> {
        let user = self.load(caller).await?;
        Ok(UserSummary::from(&user))
    }

    #[instrument(skip(self, req))]
    pub async fn update_profile(
        &self,
        caller: &ObjectId,
        req: UpdateProfileRequest,
    ) -> ApiResult<AuthResponse> {
        let mut user = self.load(caller).await?;

        user.name = merge(req.name, user.name);
        user.email = merge(req.email.map(|e| normalize_email(&e)), user.email);
        user.mobile_no = merge(req.mobile_no, user.mobile_no);
        if let Some(password) = req.password.filter(|p| !p.is_empty()) {
            user.password_hash = hash_off_thread(password).await?;
        }

        let user = self.store.save(user).await?;
        info!(user_id = %user.id, "profile updated");
        self.issue(&user)
    }

    /// Full records, password hashes included.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<UserRecord>> {
        let users = self.store.list().await?;
        Ok(users.iter().map(UserRecord::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &ObjectId) -> ApiResult<UserDetail> {
        let user = self.load(id).await?;
        Ok(UserDetail::from(&user))
    }

    /// `isAdmin` is always taken from the request; omitting it clears the flag.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: &ObjectId, req: AdminUpdateRequest) -> ApiResult<UserSummary> {
        let mut user = self.load(id).await?;

        user.name = merge(req.name, user.name);
        user.email = merge(req.email.map(|e| normalize_email(&e)), user.email);
        user.mobile_no = merge(req.mobile_no, user.mobile_no);
        user.is_admin = req.is_admin.unwrap_or(false);

        let user = self.store.save(user).await?;
        info!(user_id = %user.id, is_admin = user.is_admin, "user updated by admin");
        Ok(UserSummary::from(&user))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ObjectId) -> ApiResult<()> {
        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound);
        }
        info!(user_id = %id, "user removed");
        Ok(())
    }
}
