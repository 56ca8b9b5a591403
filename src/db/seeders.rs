//! Demo fixture for local development.

use anyhow::Result;
use chrono::{Duration, Local};
use sqlx::SqlitePool;
use tracing::info;

use super::{Dinner, User};

const DEMO_TOKEN: &str = "amzn1.ask.account.DEMO";

/// Insert a demo user with a few days of rated dinner history. Idempotent:
/// re-running overwrites the same (user, date) rows.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    info!("Seeding demo data");

    let user = User::resolve(pool, DEMO_TOKEN).await?;

    let today = Local::now().date_naive();
    let history = [
        ("chicken", Some(7), 3),
        ("pork", Some(8), 2),
        ("pork", Some(5), 1),
        ("rigatoni", Some(10), 0),
    ];

    for (name, rating, days_ago) in history {
        let date = (today - Duration::days(days_ago)).to_string();
        Dinner::upsert(pool, user.id, name, &date).await?;
        if let Some(rating) = rating {
            Dinner::set_rating(pool, user.id, rating, &date).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = test_pool().await;

        seed_demo_data(&db).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(users.0, 1);

        let dinners: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dinners")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(dinners.0, 4);
    }
}
