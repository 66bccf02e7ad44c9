use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use garde::Validate as _;
use http::StatusCode;
use recipehub_dal::recipe::{CreateRecipe, Difficulty, RecipeRepository, RecipeStatus};
use recipehub_types::claim::Authorization as _;
use serde::Deserialize;
use tracing::info;

use super::html;
use crate::{
    auth::MaybeUser,
    form::{
        deserialize_optional_id, deserialize_optional_number, FormError, FormResponse, FormResult,
    },
    state::AppState,
    validate::FormOrJson,
};

pub const MISSING_FIELDS: &str = "Title, ingredients, and instructions are required.";

pub async fn form(MaybeUser(user): MaybeUser) -> Response {
    let Some(user) = user else {
        return Redirect::to("/login").into_response();
    };
    let body = format!(
        "<h1>Submit a recipe</h1>{}",
        html::recipe_form("/submit-recipe", None, false, "Submit recipe")
    );
    html::layout("Submit a recipe", Some(&user), &body).into_response()
}

/// Fields of the recipe editor forms. Cleared number inputs arrive as empty
/// strings and fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeForm {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub recipe_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub prep_time: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub cook_time: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub servings: Option<i64>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub status: Option<RecipeStatus>,
}

impl RecipeForm {
    pub fn into_recipe(self) -> CreateRecipe {
        CreateRecipe {
            title: self.title.trim().to_string(),
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            prep_time: self.prep_time.unwrap_or(0),
            cook_time: self.cook_time.unwrap_or(0),
            servings: self.servings.unwrap_or(1),
            difficulty: self.difficulty,
            category: self.category.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            status: self.status,
        }
    }
}

/// Checks a recipe coming from one of the editor forms
pub fn check_recipe(recipe: &CreateRecipe) -> Result<(), FormError> {
    if [&recipe.title, &recipe.ingredients, &recipe.instructions]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(FormError::bad_request(MISSING_FIELDS));
    }
    recipe
        .validate()
        .map_err(|report| FormError::bad_request(format!("Invalid recipe: {report}")))
}

pub async fn submit_recipe(
    State(state): State<AppState>,
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    FormOrJson(form): FormOrJson<RecipeForm>,
) -> FormResult {
    let Some(user) = user else {
        return Err(FormError::new(
            StatusCode::UNAUTHORIZED,
            "You must be logged in to submit a recipe.",
        ));
    };
    let mut recipe = form.into_recipe();
    check_recipe(&recipe)?;
    if !user.is_admin() || recipe.status.is_none() {
        recipe.status = Some(state.config().submission_status);
    }

    let created = repository
        .create(recipe, user.id)
        .await
        .map_err(|e| FormError::storage("Failed to submit recipe. Please try again.", e))?;
    let id = created.recipe.id;
    info!("User {} submitted recipe {id}", user.id);

    let response = if created.recipe.status == RecipeStatus::Published {
        FormResponse::success(
            "Recipe submitted successfully! Your recipe has been added to the collection.",
        )
        .with_redirect(format!("/recipes/{id}"))
    } else {
        FormResponse::success(
            "Recipe submitted successfully! It will appear in the collection once approved.",
        )
        .with_redirect("/my-recipes")
    };
    Ok(response.with_recipe_id(id))
}
