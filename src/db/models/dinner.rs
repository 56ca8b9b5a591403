//! Dinner records and rating aggregation.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

/// A single day's dinner entry for one user.
///
/// `rating` is `None` until the user rates the dinner; a stored rating of 0
/// is a real rating and counts toward averages.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dinner {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// ISO-8601 calendar date (YYYY-MM-DD)
    pub date: String,
    pub rating: Option<i64>,
}

impl Dinner {
    /// Get the dinner for a (user, date), if one is set. The UNIQUE index on
    /// `(user_id, date)` guarantees at most one row.
    pub async fn find_for_date(
        db: &SqlitePool,
        user_id: i64,
        date: &str,
    ) -> Result<Option<Dinner>, sqlx::Error> {
        debug!(user_id, date, "Looking up dinner");

        sqlx::query_as::<_, Dinner>("SELECT * FROM dinners WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(date)
            .fetch_optional(db)
            .await
    }

    /// Check whether the date has a dinner set.
    pub async fn exists_for_date(
        db: &SqlitePool,
        user_id: i64,
        date: &str,
    ) -> Result<bool, sqlx::Error> {
        Ok(Self::find_for_date(db, user_id, date).await?.is_some())
    }

    /// Set the dinner for a date, overwriting the name of any existing entry
    /// in place. An existing rating is preserved. Returns the resulting row.
    pub async fn upsert(
        db: &SqlitePool,
        user_id: i64,
        name: &str,
        date: &str,
    ) -> Result<Dinner, sqlx::Error> {
        debug!(user_id, name, date, "Setting dinner");

        sqlx::query_as::<_, Dinner>(
            r#"
            INSERT INTO dinners (user_id, name, date)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id, date) DO UPDATE SET name = excluded.name
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(date)
        .fetch_one(db)
        .await
    }

    /// Rate the dinner set for a date. Returns false without writing when the
    /// date has no dinner; absence is a normal outcome, not an error.
    pub async fn set_rating(
        db: &SqlitePool,
        user_id: i64,
        rating: i64,
        date: &str,
    ) -> Result<bool, sqlx::Error> {
        debug!(user_id, rating, date, "Rating dinner");

        let result = sqlx::query("UPDATE dinners SET rating = ? WHERE user_id = ? AND date = ?")
            .bind(rating)
            .bind(user_id)
            .bind(date)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every time the user has had a dinner with this name, oldest first.
    pub async fn all_named(
        db: &SqlitePool,
        user_id: i64,
        name: &str,
    ) -> Result<Vec<Dinner>, sqlx::Error> {
        sqlx::query_as::<_, Dinner>(
            "SELECT * FROM dinners WHERE user_id = ? AND name = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(name)
        .fetch_all(db)
        .await
    }
}

/// Per-name rating statistics across a user's dinner history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DinnerAverage {
    pub name: String,
    /// How many times the user has had this dinner, rated or not.
    pub times_had: usize,
    /// How many of those entries carry a rating.
    pub times_rated: usize,
    /// Mean over rated entries only. 0.0 when `times_rated` is 0; callers
    /// must check `times_rated` before speaking an average.
    pub average: f64,
}

impl DinnerAverage {
    /// Statistics for one dinner name, or None when the user has never had
    /// it. Only entries with a rating contribute to the average.
    pub async fn for_name(
        db: &SqlitePool,
        user_id: i64,
        name: &str,
    ) -> Result<Option<DinnerAverage>, sqlx::Error> {
        let dinners = Dinner::all_named(db, user_id, name).await?;
        if dinners.is_empty() {
            return Ok(None);
        }

        let times_had = dinners.len();
        let rated: Vec<i64> = dinners.iter().filter_map(|d| d.rating).collect();
        let times_rated = rated.len();
        let average = if times_rated > 0 {
            rated.iter().sum::<i64>() as f64 / times_rated as f64
        } else {
            0.0
        };

        Ok(Some(DinnerAverage {
            name: name.to_string(),
            times_had,
            times_rated,
            average,
        }))
    }

    /// The user's best-rated dinners, descending by average rating. `limit`
    /// is clamped to 1..=10. Averages cover rated entries only; names with
    /// no rated entry are excluded from the ranking. Ties keep
    /// first-occurrence order in the history.
    pub async fn top_for_user(
        db: &SqlitePool,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<DinnerAverage>, sqlx::Error> {
        let limit = limit.clamp(1, 10);

        let rows: Vec<(String, Option<i64>)> =
            sqlx::query_as("SELECT name, rating FROM dinners WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(db)
                .await?;

        // Group by name, preserving first-occurrence order.
        // (name, rating sum, times rated, times had)
        let mut groups: Vec<(String, i64, usize, usize)> = Vec::new();
        for (name, rating) in rows {
            match groups.iter_mut().find(|(n, _, _, _)| *n == name) {
                Some((_, sum, rated, had)) => {
                    *had += 1;
                    if let Some(rating) = rating {
                        *sum += rating;
                        *rated += 1;
                    }
                }
                None => match rating {
                    Some(rating) => groups.push((name, rating, 1, 1)),
                    None => groups.push((name, 0, 0, 1)),
                },
            }
        }

        let mut averages: Vec<DinnerAverage> = groups
            .into_iter()
            .filter(|(_, _, rated, _)| *rated > 0)
            .map(|(name, sum, rated, had)| DinnerAverage {
                name,
                times_had: had,
                times_rated: rated,
                average: sum as f64 / rated as f64,
            })
            .collect();

        // Stable sort keeps first-occurrence order for equal averages.
        averages.sort_by(|a, b| b.average.total_cmp(&a.average));
        averages.truncate(limit);

        Ok(averages)
    }
}
