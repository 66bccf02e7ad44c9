use std::fmt::Write as _;

use axum::{
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use garde::Validate;
use recipehub_dal::{
    favorite::FavoriteRepository,
    rating::RatingRepository,
    recipe::{RecipeRepository, RecipeStatus, StatusFilter},
};
use recipehub_types::claim::Authorization as _;
use serde::Deserialize;

use super::{
    html::{self, escape},
    PageResult,
};
use crate::{
    auth::MaybeUser,
    rest_api::paging::{parsers::split_sort, Page, RecipeQuery},
    validate::Garde,
};

pub const CATALOG_PAGE_SIZE: u32 = 12;
const DEFAULT_SORT: &str = "created_at:desc";
const SORT_OPTIONS: &[(&str, &str)] = &[
    ("created_at:desc", "Newest first"),
    ("created_at:asc", "Oldest first"),
    ("title:asc", "Title A-Z"),
    ("title:desc", "Title Z-A"),
    ("rating:desc", "Top rated"),
];

/// Query of the catalog pages, `sort` combines field and direction
#[derive(Debug, Clone, Default, Validate, Deserialize)]
pub struct CatalogQuery {
    #[garde(range(min = 1))]
    pub page: Option<u32>,
    #[garde(length(max = 255))]
    pub search: Option<String>,
    #[garde(length(max = 100))]
    pub category: Option<String>,
    #[garde(length(max = 20))]
    pub status: Option<String>,
    #[garde(length(max = 120))]
    pub sort: Option<String>,
}

impl CatalogQuery {
    fn sort(&self) -> &str {
        self.sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT)
    }

    pub fn recipe_query(&self) -> RecipeQuery {
        let (orderby, order) = split_sort(self.sort());
        RecipeQuery {
            page: self.page,
            per_page: Some(CATALOG_PAGE_SIZE),
            search: self.search.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
            orderby: orderby.map(str::to_string),
            order: order.map(str::to_string),
        }
    }
}

fn login_redirect() -> Response {
    Redirect::to("/login").into_response()
}

pub async fn list(
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    Garde(Query(query)): Garde<Query<CatalogQuery>>,
) -> PageResult {
    let recipe_query = query.recipe_query();
    let params = recipe_query.listing_params(CATALOG_PAGE_SIZE)?;
    let filter = recipe_query.filter(StatusFilter::default());
    let batch = repository
        .list(&filter, params, user.as_ref().map(|u| u.id))
        .await?;
    let page = Page::from_batch(batch, CATALOG_PAGE_SIZE);
    let categories = repository.categories().await?;

    let search = query.search.as_deref().unwrap_or_default();
    let category = query.category.as_deref().unwrap_or_default();
    let sort = query.sort();

    let mut body = String::from(r#"<h1>Recipes</h1><form class="filters" method="get" action="/recipes">"#);
    let _ = write!(
        body,
        r#"<input type="search" name="search" placeholder="Search recipes" value="{}">"#,
        escape(search)
    );
    let _ = write!(
        body,
        r#"<select name="category"><option value="">All categories</option>{}</select>"#,
        html::select_options(categories.iter().map(|c| (c.as_str(), c.as_str())), category)
    );
    let _ = write!(
        body,
        r#"<select name="sort">{}</select><button type="submit">Filter</button></form>"#,
        html::select_options(SORT_OPTIONS.iter().copied(), sort)
    );
    let _ = write!(
        body,
        r#"<p class="count">{} recipes found</p>"#,
        page.total
    );
    body.push_str(&html::recipe_grid(
        &page.rows,
        user.is_some(),
        false,
        "No recipes found.",
    ));
    body.push_str(&html::pagination(
        "/recipes",
        &[("search", search), ("category", category), ("sort", sort)],
        page.page,
        page.total_pages,
    ));

    Ok(html::layout("Recipes", user.as_ref(), &body))
}

fn rating_summary(average: f64, count: i64) -> String {
    if count == 0 {
        "Not rated yet".to_string()
    } else {
        format!("{average:.2} ({count} ratings)")
    }
}

fn list_items(text: &str) -> String {
    html::split_lines(text)
        .into_iter()
        .map(|line| format!("<li>{}</li>", escape(line)))
        .collect()
}

pub async fn detail(
    Path(id): Path<i64>,
    recipes: RecipeRepository,
    ratings: RatingRepository,
    MaybeUser(user): MaybeUser,
) -> PageResult {
    let view = recipes.get(id, user.as_ref().map(|u| u.id)).await?;
    let summary = ratings.summary(id).await?;
    let recipe = &view.recipe;

    let mut body = format!(
        r#"<article class="recipe-detail"><h1>{}</h1>"#,
        escape(&recipe.title)
    );
    if !recipe.image_url.is_empty() {
        let _ = write!(
            body,
            r#"<img src="{}" alt="{}">"#,
            escape(&recipe.image_url),
            escape(&recipe.title)
        );
    }
    if !recipe.description.is_empty() {
        let _ = write!(
            body,
            r#"<p class="description">{}</p>"#,
            escape(&recipe.description)
        );
    }
    let _ = write!(
        body,
        r#"<ul class="meta"><li>Prep {} min</li><li>Cook {} min</li><li>Total {} min</li><li>Serves {}</li><li>{}</li>"#,
        recipe.prep_time,
        recipe.cook_time,
        recipe.total_time(),
        recipe.servings,
        recipe.difficulty
    );
    if !recipe.category.is_empty() {
        let _ = write!(body, "<li>{}</li>", escape(&recipe.category));
    }
    let _ = write!(
        body,
        r#"</ul><p>Rating: <span class="rating-summary">{}</span></p>"#,
        rating_summary(summary.average, summary.count)
    );

    if let Some(user) = &user {
        let own_rating = ratings
            .get(user.id, id)
            .await?
            .map(|r| r.rating)
            .unwrap_or_default();
        body.push_str(&html::favorite_button(&view));
        let _ = write!(
            body,
            r#"<div class="rating-stars" data-recipe="{id}">Your rating: "#
        );
        for value in 1..=5 {
            let _ = write!(
                body,
                r#"<button type="button" class="rating-star{}" data-value="{value}" title="{value} stars">&#9733;</button>"#,
                if value <= own_rating { " active" } else { "" }
            );
        }
        body.push_str("</div>");
        if user.is_admin() {
            let _ = write!(
                body,
                r#"<p><a href="/admin/recipes/{id}/edit">Edit recipe</a></p>"#
            );
        }
    }

    let _ = write!(
        body,
        "<h2>Ingredients</h2><ul class=\"ingredients\">{}</ul><h2>Instructions</h2><ol class=\"instructions\">{}</ol></article>",
        list_items(&recipe.ingredients),
        list_items(&recipe.instructions)
    );

    Ok(html::layout(&recipe.title, user.as_ref(), &body))
}

pub async fn favorites(
    favorites: FavoriteRepository,
    MaybeUser(user): MaybeUser,
) -> PageResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect());
    };
    let views = favorites.list_recipes(user.id).await?;
    let body = format!(
        "<h1>My favorites</h1>{}",
        html::recipe_grid(&views, true, false, "You have no favorite recipes yet.")
    );
    Ok(html::layout("My favorites", Some(&user), &body).into_response())
}

pub async fn my_recipes(
    repository: RecipeRepository,
    MaybeUser(user): MaybeUser,
    Garde(Query(query)): Garde<Query<CatalogQuery>>,
) -> PageResult<Response> {
    let Some(user) = user else {
        return Ok(login_redirect());
    };
    let recipe_query = query.recipe_query();
    let status = recipe_query.status_filter(StatusFilter::All)?;
    let params = recipe_query.listing_params(CATALOG_PAGE_SIZE)?;
    let batch = repository.list_by_owner(user.id, status, params).await?;
    let page = Page::from_batch(batch, CATALOG_PAGE_SIZE);

    let current = status.to_string();
    let mut body = String::from(r#"<h1>My recipes</h1><nav class="tabs">"#);
    let tabs = std::iter::once(StatusFilter::All)
        .chain(RecipeStatus::ALL.into_iter().map(StatusFilter::Only));
    for tab in tabs {
        let name = tab.to_string();
        let _ = write!(
            body,
            r#"<a href="/my-recipes?status={name}"{}>{name}</a>"#,
            if name == current { r#" class="current""# } else { "" }
        );
    }
    body.push_str("</nav>");
    body.push_str(&html::recipe_grid(
        &page.rows,
        true,
        true,
        "You have not submitted any recipes yet.",
    ));
    body.push_str(&html::pagination(
        "/my-recipes",
        &[("status", current.as_str())],
        page.page,
        page.total_pages,
    ));

    Ok(html::layout("My recipes", Some(&user), &body).into_response())
}
