use axum::routing::{get, post, put};
use recipehub_types::claim::Role;

use crate::{auth::RequiredRolesLayer, state::AppState};

pub mod paging;
pub mod recipe;

/// JSON API router - must be nested on /api path!
pub fn router() -> axum::Router<AppState> {
    let admin_only = put(recipe::update)
        .delete(recipe::delete)
        .route_layer(RequiredRolesLayer::new([Role::Admin]));

    axum::Router::new()
        .route("/recipes", get(recipe::list).post(recipe::create))
        .route("/recipes/{id}", get(recipe::get).merge(admin_only))
        .route(
            "/recipes/{id}/favorite",
            post(recipe::add_favorite).delete(recipe::remove_favorite),
        )
        .route("/recipes/{id}/rating", post(recipe::rate))
        .route("/favorites", get(recipe::list_favorites))
        .route("/my-recipes", get(recipe::list_my_recipes))
        .route("/categories", get(recipe::list_categories))
        .nest("/users", crate::user::router())
}
