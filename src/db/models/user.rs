//! User model and identity resolution.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

/// A local user record, keyed by the opaque token the voice platform
/// assigns to the account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub external_id: String,
    pub created_at: String,
}

impl User {
    /// Look up the user for `external_id`, creating the record on first
    /// contact. Atomic: the UNIQUE constraint on `external_id` plus the
    /// single-statement upsert guarantee one row per token even under
    /// concurrent first contacts.
    pub async fn resolve(db: &SqlitePool, external_id: &str) -> Result<User, sqlx::Error> {
        debug!(external_id, "Resolving user");

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (external_id, created_at)
            VALUES (?, ?)
            ON CONFLICT(external_id) DO UPDATE SET external_id = excluded.external_id
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(&now)
        .fetch_one(db)
        .await
    }

    /// Check whether a user record exists for `external_id`. Store failures
    /// are reported as "not found" rather than propagated.
    pub async fn exists(db: &SqlitePool, external_id: &str) -> bool {
        let found = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(db)
            .await;

        match found {
            Ok(user) => user.is_some(),
            Err(e) => {
                warn!("User existence check failed: {}", e);
                false
            }
        }
    }
}
