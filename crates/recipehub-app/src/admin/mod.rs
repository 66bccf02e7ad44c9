//! Admin pages and their form endpoints. The pages sit behind
//! [`RequiredRolesLayer`], form endpoints check the role themselves so that
//! refusals keep the form reply shape.

use std::fmt::Write as _;

use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Router,
};
use garde::Validate;
use http::StatusCode;
use recipehub_dal::{
    recipe::{RecipeRepository, RecipeStatus, StatusFilter, UpdateRecipe},
    Error as DalError,
};
use recipehub_types::claim::{Authorization as _, Role, UserClaim};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::{MaybeUser, RequiredRolesLayer},
    form::{deserialize_optional_id, FormError, FormResponse, FormResult},
    pages::{
        html::{self, escape},
        submit::{check_recipe, RecipeForm},
        PageResult,
    },
    rest_api::paging::{Page, RecipeQuery},
    state::AppState,
    validate::{FormOrJson, Garde},
};

pub const ADMIN_PAGE_SIZE: u32 = 50;

/// Admin router - must be nested on /admin path!
pub fn router() -> Router<AppState> {
    let pages = Router::new()
        .route("/", get(list))
        .route("/recipes/new", get(new_recipe))
        .route("/recipes/{id}/edit", get(edit_recipe))
        .route_layer(RequiredRolesLayer::new([Role::Admin]));

    Router::new()
        .route("/recipes/save", post(save_recipe))
        .route("/recipes/delete", post(delete_recipe))
        .merge(pages)
}

#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct AdminQuery {
    #[garde(range(min = 1))]
    pub page: Option<u32>,
    #[garde(length(max = 20))]
    pub status: Option<String>,
    #[garde(length(max = 255))]
    pub search: Option<String>,
}

async fn list(
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    Garde(Query(query)): Garde<Query<AdminQuery>>,
) -> PageResult {
    let recipe_query = RecipeQuery {
        page: query.page,
        per_page: Some(ADMIN_PAGE_SIZE),
        search: query.search.clone(),
        status: query.status.clone(),
        ..Default::default()
    };
    let status = recipe_query.status_filter(StatusFilter::All)?;
    let params = recipe_query.listing_params(ADMIN_PAGE_SIZE)?;
    let batch = repository
        .list(&recipe_query.filter(status), params, None)
        .await?;
    let page = Page::from_batch(batch, ADMIN_PAGE_SIZE);

    let current = status.to_string();
    let search = query.search.as_deref().unwrap_or_default();
    let statuses = std::iter::once("all").chain(RecipeStatus::ALL.into_iter().map(|s| s.as_str()));

    let mut body = String::from(
        r#"<h1>Manage recipes</h1><p><a href="/admin/recipes/new">Add recipe</a></p><form class="filters" method="get" action="/admin">"#,
    );
    let _ = write!(
        body,
        r#"<select name="status">{}</select><input type="search" name="search" placeholder="Search" value="{}"><button type="submit">Filter</button></form>"#,
        html::select_options(statuses.map(|s| (s, s)), &current),
        escape(search)
    );
    let _ = write!(
        body,
        r#"<p class="count">{} recipes</p><table><thead><tr><th>Title</th><th>Category</th><th>Status</th><th>Rating</th><th>Created</th><th></th></tr></thead><tbody>"#,
        page.total
    );
    for view in &page.rows {
        let recipe = &view.recipe;
        let _ = write!(
            body,
            r#"<tr><td><a href="/admin/recipes/{id}/edit">{title}</a></td><td>{category}</td><td><span class="status status-{status}">{status}</span></td><td>{rating}</td><td>{created}</td><td><a href="/recipes/{id}">View</a> <button type="button" class="admin-delete" data-recipe="{id}">Delete</button></td></tr>"#,
            id = recipe.id,
            title = escape(&recipe.title),
            category = escape(&recipe.category),
            status = recipe.status,
            rating = html::rating_badge(view.rating),
            created = recipe.created_at.date(),
        );
    }
    body.push_str("</tbody></table>");
    body.push_str(&html::pagination(
        "/admin",
        &[("status", current.as_str()), ("search", search)],
        page.page,
        page.total_pages,
    ));

    Ok(html::layout("Manage recipes", user.as_ref(), &body))
}

async fn new_recipe(MaybeUser(user): MaybeUser) -> PageResult {
    let body = format!(
        "<h1>Add recipe</h1>{}",
        html::recipe_form("/admin/recipes/save", None, true, "Add recipe")
    );
    Ok(html::layout("Add recipe", user.as_ref(), &body))
}

async fn edit_recipe(
    Path(id): Path<i64>,
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
) -> PageResult {
    let view = repository.get_any(id, None).await?;
    let body = format!(
        r#"<h1>Edit recipe</h1>{}<p><a href="/admin">Back to list</a></p>"#,
        html::recipe_form("/admin/recipes/save", Some(&view.recipe), true, "Save recipe")
    );
    Ok(html::layout("Edit recipe", user.as_ref(), &body))
}

fn require_admin(user: Option<UserClaim>) -> Result<UserClaim, FormError> {
    match user {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) => Err(FormError::new(StatusCode::FORBIDDEN, "Permission denied")),
        None => Err(FormError::new(
            StatusCode::UNAUTHORIZED,
            "You must be logged in as an administrator.",
        )),
    }
}

fn not_found_or(message: &'static str) -> impl Fn(DalError) -> FormError {
    move |e| match e {
        DalError::RecordNotFound(_) => FormError::new(StatusCode::NOT_FOUND, "Recipe not found"),
        e => FormError::storage(message, e),
    }
}

async fn save_recipe(
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    FormOrJson(form): FormOrJson<RecipeForm>,
) -> FormResult {
    let user = require_admin(user)?;
    let recipe_id = form.recipe_id;
    let recipe = form.into_recipe();
    check_recipe(&recipe)?;

    let response = match recipe_id {
        None => {
            let created = repository
                .create(recipe, user.id)
                .await
                .map_err(not_found_or("Failed to save recipe"))?;
            info!("Admin {} added recipe {}", user.id, created.recipe.id);
            FormResponse::success("Recipe added successfully").with_recipe_id(created.recipe.id)
        }
        Some(id) => {
            repository
                .update(id, UpdateRecipe::from(recipe))
                .await
                .map_err(not_found_or("Failed to save recipe"))?;
            info!("Admin {} updated recipe {id}", user.id);
            FormResponse::success("Recipe updated successfully").with_recipe_id(id)
        }
    };
    Ok(response.with_redirect("/admin"))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecipeForm {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub recipe_id: Option<i64>,
}

async fn delete_recipe(
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    FormOrJson(form): FormOrJson<DeleteRecipeForm>,
) -> FormResult {
    let user = require_admin(user)?;
    let id = form
        .recipe_id
        .ok_or_else(|| FormError::bad_request("Recipe id is required"))?;
    repository
        .delete(id)
        .await
        .map_err(not_found_or("Failed to delete recipe"))?;
    info!("Admin {} deleted recipe {id}", user.id);

    Ok(FormResponse::success("Recipe deleted successfully").with_recipe_id(id))
}
