use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Result, ChosenDB, Error, Pool};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateRecipe {
    #[garde(range(min = 1, max = 5))]
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub rating: i64,
    pub created_at: time::PrimitiveDateTime,
}

/// Aggregate over all ratings of one recipe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

pub type RatingRepository = RatingRepositoryImpl<Pool>;

pub struct RatingRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> RatingRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Inserts the user's rating or replaces the previous one
    pub async fn upsert(&self, user_id: i64, recipe_id: i64, rating: i64) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(Error::InvalidValue(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        sqlx::query(
            "INSERT INTO ratings (user_id, recipe_id, rating) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, recipe_id) DO UPDATE SET rating = excluded.rating, created_at = CURRENT_TIMESTAMP",
        )
        .bind(user_id)
        .bind(recipe_id)
        .bind(rating)
        .execute(&self.executor)
        .await?;
        debug!("User {user_id} rated recipe {recipe_id} with {rating}");
        Ok(())
    }

    pub async fn get(&self, user_id: i64, recipe_id: i64) -> Result<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT id, user_id, recipe_id, rating, created_at FROM ratings WHERE user_id = ? AND recipe_id = ?",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.executor)
        .await?;
        Ok(rating)
    }

    /// Average rounded to two decimals, 0 when the recipe has no ratings
    pub async fn average(&self, recipe_id: i64) -> Result<f64> {
        let average: f64 = sqlx::query_scalar(
            "SELECT COALESCE(ROUND(AVG(rating), 2), 0.0) FROM ratings WHERE recipe_id = ?",
        )
        .bind(recipe_id)
        .fetch_one(&self.executor)
        .await?;
        Ok(average)
    }

    pub async fn count(&self, recipe_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM ratings WHERE recipe_id = ?")
            .bind(recipe_id)
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn summary(&self, recipe_id: i64) -> Result<RatingSummary> {
        Ok(RatingSummary {
            average: self.average(recipe_id).await?,
            count: self.count(recipe_id).await?,
        })
    }
}
