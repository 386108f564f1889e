use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use mongodb::bson::oid::ObjectId;
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::repo_types::User};

/// Caller identity taken from a valid bearer token.
pub struct AuthUser(pub ObjectId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".into()))?;

        match keys.verify_user_id(token) {
            Ok(id) => Ok(AuthUser(id)),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(ApiError::Unauthorized("Not authorized, token failed".into()))
            }
        }
    }
}

/// Admin gate: a valid token whose user still exists and has `isAdmin` set.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(id) = AuthUser::from_request_parts(parts, state).await?;

        match state.store.find_by_id(&id).await? {
            Some(user) if user.is_admin => Ok(AdminUser(user)),
            _ => {
                warn!(user_id = %id, "admin route denied");
                Err(ApiError::Unauthorized("Not authorized as an admin".into()))
            }
        }
    }
}
