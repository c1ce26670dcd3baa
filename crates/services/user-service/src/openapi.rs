//! OpenAPI documentation.

use utoipa::OpenApi;

use domain::{CreateUser, UpdateUser, UserResponse};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::update_user,
    ),
    components(
        schemas(
            CreateUser,
            UpdateUser,
            UserResponse,
        )
    ),
    tags(
        (name = "Users", description = "User directory endpoints"),
    )
)]
pub struct ApiDoc;
