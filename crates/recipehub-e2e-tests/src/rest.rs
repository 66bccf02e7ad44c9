use anyhow::{anyhow, Result};
use recipehub_app::rest_api::paging::Page;
use recipehub_dal::recipe::RecipeView;
use reqwest::Url;
use tracing::info;

pub async fn create_recipe(
    client: &reqwest::Client,
    base_url: &Url,
    payload: &serde_json::Value,
) -> Result<RecipeView> {
    let api_url = base_url.join("api/recipes")?;
    let response = client.post(api_url).json(payload).send().await?;
    info!("Create recipe response: {:#?}", response);
    if response.status() != reqwest::StatusCode::CREATED {
        return Err(anyhow!("Recipe not created: {}", response.status()));
    }
    let recipe: RecipeView = response.json().await?;
    Ok(recipe)
}

pub async fn list_recipes(
    client: &reqwest::Client,
    base_url: &Url,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Page<RecipeView>> {
    let mut url = base_url.join(path)?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Listing failed: {}", response.status()));
    }
    let page: Page<RecipeView> = response.json().await?;
    Ok(page)
}

pub fn titles(page: &Page<RecipeView>) -> Vec<&str> {
    page.rows.iter().map(|r| r.recipe.title.as_str()).collect()
}
