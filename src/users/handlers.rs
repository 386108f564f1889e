use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        AdminUpdateRequest, AuthResponse, LoginRequest, MessageResponse, RegisterRequest,
        UpdateProfileRequest, UserDetail, UserRecord, UserSummary,
    },
    services::{parse_id, UserService},
};
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::ApiResult,
    extract::JsonBody,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/", get(list_users).post(register))
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip_all)]
pub async fn login(
    State(users): State<UserService>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(users.authenticate(payload).await?))
}

#[instrument(skip_all)]
pub async fn register(
    State(users): State<UserService>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let created = users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(users))]
pub async fn get_profile(
    State(users): State<UserService>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserSummary>> {
    Ok(Json(users.profile(&user_id).await?))
}

#[instrument(skip(users, payload))]
pub async fn update_profile(
    State(users): State<UserService>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(users.update_profile(&user_id, payload).await?))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(users): State<UserService>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<Vec<UserRecord>>> {
    Ok(Json(users.list().await?))
}

#[instrument(skip(users, admin), fields(admin_id = %admin.id))]
pub async fn get_user(
    State(users): State<UserService>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserDetail>> {
    Ok(Json(users.get(&parse_id(&id)?).await?))
}

#[instrument(skip(users, admin, payload), fields(admin_id = %admin.id))]
pub async fn update_user(
    State(users): State<UserService>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AdminUpdateRequest>,
) -> ApiResult<Json<UserSummary>> {
    Ok(Json(users.update(&parse_id(&id)?, payload).await?))
}

#[instrument(skip(users, admin), fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(users): State<UserService>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    users.delete(&parse_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "User removed".into(),
    }))
}
