use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row as _};
use tracing::debug;

use crate::{
    error::Result, escape_like, Batch, ChosenDB, ChosenRow, Error, ListingParams, Pool,
};

/// Fields a recipe listing can be sorted by
pub const VALID_ORDER_FIELDS: &[&str] = &[
    "id",
    "title",
    "created_at",
    "updated_at",
    "prep_time",
    "cook_time",
    "servings",
    "difficulty",
    "category",
    "rating",
];

const DEFAULT_ORDER: &str = "created_at DESC";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue(format!("unknown difficulty {s}")))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RecipeStatus {
    #[default]
    Published,
    Pending,
    Draft,
}

impl RecipeStatus {
    pub const ALL: [RecipeStatus; 3] = [
        RecipeStatus::Published,
        RecipeStatus::Pending,
        RecipeStatus::Draft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Published => "published",
            RecipeStatus::Pending => "pending",
            RecipeStatus::Draft => "draft",
        }
    }
}

impl Display for RecipeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipeStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidValue(format!("unknown status {s}")))
    }
}

/// Status scope of a listing, `all` disables status filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(RecipeStatus),
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(RecipeStatus::Published)
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        Err(garde::Error::new("must not be empty"))
    } else {
        Ok(())
    }
}

fn http_url(value: &str, _ctx: &()) -> garde::Result {
    if value.is_empty() || value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(garde::Error::new("must be an http(s) URL"))
    }
}

fn default_servings() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRecipe {
    #[garde(custom(not_blank), length(max = 255))]
    pub title: String,

    #[serde(default)]
    #[garde(length(max = 10000))]
    pub description: String,

    #[garde(custom(not_blank), length(max = 20000))]
    pub ingredients: String,

    #[garde(custom(not_blank), length(max = 20000))]
    pub instructions: String,

    #[serde(default)]
    #[garde(range(min = 0, max = 10000))]
    pub prep_time: i64,

    #[serde(default)]
    #[garde(range(min = 0, max = 10000))]
    pub cook_time: i64,

    #[serde(default = "default_servings")]
    #[garde(range(min = 1, max = 1000))]
    pub servings: i64,

    #[serde(default)]
    #[garde(skip)]
    pub difficulty: Difficulty,

    #[serde(default)]
    #[garde(length(max = 100))]
    pub category: String,

    #[serde(default)]
    #[garde(length(max = 2000), custom(http_url))]
    pub image_url: String,

    #[serde(default)]
    #[garde(skip)]
    pub status: Option<RecipeStatus>,
}

/// Partial update, only fields that are present are written
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateRecipe {
    #[garde(inner(custom(not_blank), length(max = 255)))]
    pub title: Option<String>,

    #[garde(inner(length(max = 10000)))]
    pub description: Option<String>,

    #[garde(inner(custom(not_blank), length(max = 20000)))]
    pub ingredients: Option<String>,

    #[garde(inner(custom(not_blank), length(max = 20000)))]
    pub instructions: Option<String>,

    #[garde(inner(range(min = 0, max = 10000)))]
    pub prep_time: Option<i64>,

    #[garde(inner(range(min = 0, max = 10000)))]
    pub cook_time: Option<i64>,

    #[garde(inner(range(min = 1, max = 1000)))]
    pub servings: Option<i64>,

    #[garde(skip)]
    pub difficulty: Option<Difficulty>,

    #[garde(inner(length(max = 100)))]
    pub category: Option<String>,

    #[garde(inner(length(max = 2000), custom(http_url)))]
    pub image_url: Option<String>,

    #[garde(skip)]
    pub status: Option<RecipeStatus>,
}

impl From<CreateRecipe> for UpdateRecipe {
    fn from(value: CreateRecipe) -> Self {
        UpdateRecipe {
            title: Some(value.title),
            description: Some(value.description),
            ingredients: Some(value.ingredients),
            instructions: Some(value.instructions),
            prep_time: Some(value.prep_time),
            cook_time: Some(value.cook_time),
            servings: Some(value.servings),
            difficulty: Some(value.difficulty),
            category: Some(value.category),
            image_url: Some(value.image_url),
            status: value.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: Difficulty,
    pub category: String,
    pub image_url: String,
    pub created_by: i64,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
    pub status: RecipeStatus,
}

impl Recipe {
    pub fn total_time(&self) -> i64 {
        self.prep_time + self.cook_time
    }
}

/// Recipe as seen by a particular (possibly anonymous) user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeView {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub is_favorited: bool,
    pub rating: f64,
}

impl sqlx::FromRow<'_, ChosenRow> for RecipeView {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(RecipeView {
            recipe: <Recipe as sqlx::FromRow<'_, ChosenRow>>::from_row(row)?,
            is_favorited: row.try_get("is_favorited")?,
            rating: row.try_get("rating")?,
        })
    }
}

/// Pushes the column list of a [`RecipeView`] select over `recipes r`
pub(crate) fn push_view_columns(builder: &mut QueryBuilder<'_, ChosenDB>, viewer: Option<i64>) {
    builder
        .push(
            "r.id, r.title, r.description, r.ingredients, r.instructions, r.prep_time, \
             r.cook_time, r.servings, r.difficulty, r.category, r.image_url, r.created_by, \
             r.created_at, r.updated_at, r.status, \
             EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ",
        )
        .push_bind(viewer)
        .push(
            ") AS is_favorited, \
             COALESCE((SELECT ROUND(AVG(rt.rating), 2) FROM ratings rt WHERE rt.recipe_id = r.id), 0.0) AS rating \
             FROM recipes r",
        );
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub status: StatusFilter,
    pub category: Option<String>,
    pub search: Option<String>,
    pub created_by: Option<i64>,
}

impl RecipeFilter {
    fn push_where(&self, builder: &mut QueryBuilder<'_, ChosenDB>) {
        builder.push(" WHERE 1 = 1");
        if let StatusFilter::Only(status) = self.status {
            builder.push(" AND r.status = ").push_bind(status);
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            builder.push(" AND r.category = ").push_bind(category.to_string());
        }
        if let Some(owner) = self.created_by {
            builder.push(" AND r.created_by = ").push_bind(owner);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            builder
                .push(" AND (r.title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR r.description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}

pub type RecipeRepository = RecipeRepositoryImpl<Pool>;

pub struct RecipeRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> RecipeRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateRecipe, created_by: i64) -> Result<RecipeView> {
        payload
            .validate()
            .map_err(|e| Error::InvalidValue(e.to_string()))?;
        let result = sqlx::query(
            "INSERT INTO recipes (title, description, ingredients, instructions, prep_time, cook_time, \
             servings, difficulty, category, image_url, created_by, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(payload.title.trim())
        .bind(&payload.description)
        .bind(&payload.ingredients)
        .bind(&payload.instructions)
        .bind(payload.prep_time)
        .bind(payload.cook_time)
        .bind(payload.servings)
        .bind(payload.difficulty)
        .bind(payload.category.trim())
        .bind(payload.image_url.trim())
        .bind(created_by)
        .bind(payload.status.unwrap_or_default())
        .execute(&self.executor)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created recipe {id} by user {created_by}");
        self.get_any(id, Some(created_by)).await
    }

    pub async fn update(&self, id: i64, payload: UpdateRecipe) -> Result<RecipeView> {
        payload
            .validate()
            .map_err(|e| Error::InvalidValue(e.to_string()))?;
        let mut query = QueryBuilder::<ChosenDB>::new("UPDATE recipes SET updated_at = CURRENT_TIMESTAMP");
        if let Some(title) = payload.title {
            query.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = payload.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(ingredients) = payload.ingredients {
            query.push(", ingredients = ").push_bind(ingredients);
        }
        if let Some(instructions) = payload.instructions {
            query.push(", instructions = ").push_bind(instructions);
        }
        if let Some(prep_time) = payload.prep_time {
            query.push(", prep_time = ").push_bind(prep_time);
        }
        if let Some(cook_time) = payload.cook_time {
            query.push(", cook_time = ").push_bind(cook_time);
        }
        if let Some(servings) = payload.servings {
            query.push(", servings = ").push_bind(servings);
        }
        if let Some(difficulty) = payload.difficulty {
            query.push(", difficulty = ").push_bind(difficulty);
        }
        if let Some(category) = payload.category {
            query.push(", category = ").push_bind(category.trim().to_string());
        }
        if let Some(image_url) = payload.image_url {
            query.push(", image_url = ").push_bind(image_url.trim().to_string());
        }
        if let Some(status) = payload.status {
            query.push(", status = ").push_bind(status);
        }
        query.push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.executor).await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Recipe {id}")));
        }
        debug!("Updated recipe {id}");
        self.get_any(id, None).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Recipe {id}")));
        }
        debug!("Deleted recipe {id}");
        Ok(())
    }

    /// Published recipe only
    pub async fn get(&self, id: i64, viewer: Option<i64>) -> Result<RecipeView> {
        self.fetch_view(id, viewer, Some(RecipeStatus::Published))
            .await
    }

    /// Recipe in any status, for owners and admins
    pub async fn get_any(&self, id: i64, viewer: Option<i64>) -> Result<RecipeView> {
        self.fetch_view(id, viewer, None).await
    }

    async fn fetch_view(
        &self,
        id: i64,
        viewer: Option<i64>,
        status: Option<RecipeStatus>,
    ) -> Result<RecipeView> {
        let mut query = QueryBuilder::<ChosenDB>::new("SELECT ");
        push_view_columns(&mut query, viewer);
        query.push(" WHERE r.id = ").push_bind(id);
        if let Some(status) = status {
            query.push(" AND r.status = ").push_bind(status);
        }
        query
            .build_query_as::<RecipeView>()
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Recipe {id}")))
    }

    pub async fn list(
        &self,
        filter: &RecipeFilter,
        params: ListingParams,
        viewer: Option<i64>,
    ) -> Result<Batch<RecipeView>> {
        let order = params.ordering(VALID_ORDER_FIELDS)?;
        let order = if order.is_empty() {
            DEFAULT_ORDER.to_string()
        } else {
            order
        };

        let mut count = QueryBuilder::<ChosenDB>::new("SELECT count(*) FROM recipes r");
        filter.push_where(&mut count);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.executor)
            .await?;

        let mut query = QueryBuilder::<ChosenDB>::new("SELECT ");
        push_view_columns(&mut query, viewer);
        filter.push_where(&mut query);
        query
            .push(" ORDER BY ")
            .push(order)
            .push(", r.id DESC LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset);
        let rows = query
            .build_query_as::<RecipeView>()
            .fetch_all(&self.executor)
            .await?;

        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            rows,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    pub async fn list_by_owner(
        &self,
        owner: i64,
        status: StatusFilter,
        params: ListingParams,
    ) -> Result<Batch<RecipeView>> {
        let filter = RecipeFilter {
            status,
            created_by: Some(owner),
            ..Default::default()
        };
        self.list(&filter, params, Some(owner)).await
    }

    /// Distinct non-empty categories of published recipes
    pub async fn categories(&self) -> Result<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM recipes WHERE status = 'published' AND category <> '' ORDER BY category",
        )
        .fetch_all(&self.executor)
        .await?;
        Ok(categories)
    }
}
