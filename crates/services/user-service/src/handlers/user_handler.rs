//! User handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{CreateUser, UpdateUser, UserResponse, MISSING_UPDATE_REQUEST};

use crate::extractors::{JsonPayload, UserId};
use crate::state::AppState;

/// Mount point of the user routes
pub const USERS_PATH: &str = "/api/v1/users";

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users in storage order", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "ID is not a UUID"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse,
            headers(("Location" = String, description = "URI of the created user"))),
        (status = 400, description = "Malformed request or validation error"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonPayload(payload): JsonPayload<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_service.create_user(payload).await?;
    let location = format!("{}/{}", USERS_PATH, user.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

/// Partially update a user; absent fields are left unchanged
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Malformed request or validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    JsonPayload(payload): JsonPayload<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let payload = payload.ok_or_else(|| AppError::malformed(MISSING_UPDATE_REQUEST))?;

    let user = state.user_service.update_user(id, payload).await?;
    Ok(Json(user))
}
