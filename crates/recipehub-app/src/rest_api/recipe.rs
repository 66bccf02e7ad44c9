use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use http::StatusCode;
use recipehub_dal::{
    favorite::FavoriteRepository,
    rating::{RateRecipe, RatingRepository},
    recipe::{CreateRecipe, RecipeRepository, RecipeStatus, StatusFilter, UpdateRecipe},
};
use recipehub_types::claim::Authorization as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    auth::{CurrentUser, MaybeUser},
    error::{ApiError, ApiResult},
    repository_from_request,
    rest_api::paging::{Page, RecipeQuery},
    state::AppState,
    validate::Garde,
};

repository_from_request!(RecipeRepository);
repository_from_request!(FavoriteRepository);
repository_from_request!(RatingRepository);

pub async fn list(
    repository: RecipeRepository,
    State(state): State<AppState>,
    user: MaybeUser,
    Garde(Query(query)): Garde<Query<RecipeQuery>>,
) -> ApiResult<impl IntoResponse> {
    let status = query.status_filter(StatusFilter::Only(RecipeStatus::Published))?;
    if status != StatusFilter::Only(RecipeStatus::Published) && !user.is_admin() {
        return Err(if user.0.is_some() {
            ApiError::Forbidden
        } else {
            ApiError::Unauthorized
        });
    }
    let page_size = query.page_size(state.config().default_page_size);
    let params = query.listing_params(state.config().default_page_size)?;
    let batch = repository
        .list(&query.filter(status), params, user.id())
        .await?;
    Ok((StatusCode::OK, Json(Page::from_batch(batch, page_size))))
}

pub async fn get(
    Path(id): Path<i64>,
    repository: RecipeRepository,
    user: MaybeUser,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id, user.id()).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(
    repository: RecipeRepository,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Garde(Json(mut payload)): Garde<Json<CreateRecipe>>,
) -> ApiResult<impl IntoResponse> {
    if !user.is_admin() {
        payload.status = Some(state.config().submission_status);
    }
    let record = repository.create(payload, user.id).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: RecipeRepository,
    CurrentUser(user): CurrentUser,
    Garde(Json(payload)): Garde<Json<UpdateRecipe>>,
) -> ApiResult<impl IntoResponse> {
    repository.update(id, payload).await?;
    let record = repository.get_any(id, Some(user.id)).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: RecipeRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;

    Ok((StatusCode::NO_CONTENT, ()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteState {
    pub recipe_id: i64,
    pub is_favorited: bool,
}

pub async fn add_favorite(
    Path(id): Path<i64>,
    recipes: RecipeRepository,
    favorites: FavoriteRepository,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    // only published recipes can be favorited
    recipes.get(id, Some(user.id)).await?;
    let added = favorites.add(user.id, id).await?;
    debug!("Favorite {id} for {}, new: {added}", user.id);

    Ok((
        StatusCode::OK,
        Json(FavoriteState {
            recipe_id: id,
            is_favorited: true,
        }),
    ))
}

pub async fn remove_favorite(
    Path(id): Path<i64>,
    favorites: FavoriteRepository,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    favorites.remove(user.id, id).await?;

    Ok((
        StatusCode::OK,
        Json(FavoriteState {
            recipe_id: id,
            is_favorited: false,
        }),
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingState {
    pub recipe_id: i64,
    pub user_rating: i64,
    pub rating: f64,
    pub count: i64,
}

pub async fn rate(
    Path(id): Path<i64>,
    recipes: RecipeRepository,
    ratings: RatingRepository,
    CurrentUser(user): CurrentUser,
    Garde(Json(payload)): Garde<Json<RateRecipe>>,
) -> ApiResult<impl IntoResponse> {
    recipes.get(id, Some(user.id)).await?;
    ratings.upsert(user.id, id, payload.rating).await?;
    let summary = ratings.summary(id).await?;

    Ok((
        StatusCode::OK,
        Json(RatingState {
            recipe_id: id,
            user_rating: payload.rating,
            rating: summary.average,
            count: summary.count,
        }),
    ))
}

pub async fn list_favorites(
    favorites: FavoriteRepository,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let records = favorites.list_recipes(user.id).await?;

    Ok((StatusCode::OK, Json(records)))
}

pub async fn list_my_recipes(
    repository: RecipeRepository,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Garde(Query(query)): Garde<Query<RecipeQuery>>,
) -> ApiResult<impl IntoResponse> {
    let status = query.status_filter(StatusFilter::All)?;
    let page_size = query.page_size(state.config().default_page_size);
    let params = query.listing_params(state.config().default_page_size)?;
    let batch = repository.list_by_owner(user.id, status, params).await?;

    Ok((StatusCode::OK, Json(Page::from_batch(batch, page_size))))
}

pub async fn list_categories(repository: RecipeRepository) -> ApiResult<impl IntoResponse> {
    let categories = repository.categories().await?;

    Ok((StatusCode::OK, Json(categories)))
}
