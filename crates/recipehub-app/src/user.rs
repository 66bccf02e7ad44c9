use crate::{auth::RequiredRolesLayer, error::ApiResult, validate::Garde};
use recipehub_dal::user::{CreateUser, UserRepository};

use axum::{
    response::IntoResponse,
    routing::post,
    Json,
};
use http::StatusCode;
use recipehub_types::claim::Role;

use crate::state::AppState;

pub async fn create_user(
    user_registry: UserRepository,
    Garde(Json(payload)): Garde<Json<CreateUser>>,
) -> ApiResult<impl IntoResponse> {
    let user = user_registry.create(payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(user_registry: UserRepository) -> ApiResult<impl IntoResponse> {
    let users = user_registry.list(100).await?;
    Ok((StatusCode::OK, Json(users)))
}

/// Admin-only user management
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(create_user).get(list_users))
        .route_layer(RequiredRolesLayer::new([Role::Admin]))
}
