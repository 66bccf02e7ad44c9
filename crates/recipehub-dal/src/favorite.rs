use sqlx::QueryBuilder;
use tracing::debug;

use crate::{
    error::Result,
    recipe::{push_view_columns, RecipeView},
    ChosenDB, Pool,
};

pub type FavoriteRepository = FavoriteRepositoryImpl<Pool>;

pub struct FavoriteRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> FavoriteRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Returns true if the favorite did not exist before
    pub async fn add(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, recipe_id) VALUES (?, ?) ON CONFLICT (user_id, recipe_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.executor)
        .await?;
        let added = result.rows_affected() > 0;
        debug!("Favorite recipe {recipe_id} for user {user_id}, new: {added}");
        Ok(added)
    }

    /// Returns true if there was a favorite to remove
    pub async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_favorited(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = ? AND recipe_id = ?)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.executor)
        .await?;
        Ok(found)
    }

    /// Published favorites of the user, most recently favorited first
    pub async fn list_recipes(&self, user_id: i64) -> Result<Vec<RecipeView>> {
        let mut query = QueryBuilder::<ChosenDB>::new("SELECT ");
        push_view_columns(&mut query, Some(user_id));
        query
            .push(" JOIN favorites fav ON fav.recipe_id = r.id WHERE fav.user_id = ")
            .push_bind(user_id)
            .push(" AND r.status = 'published' ORDER BY fav.created_at DESC, fav.id DESC");
        let recipes = query
            .build_query_as::<RecipeView>()
            .fetch_all(&self.executor)
            .await?;
        Ok(recipes)
    }
}
