use sqlx::PgPool;
use uuid::Uuid;

/// Queries for the per-user saved-plan collection. The human-chosen plan
/// name is the storage key, so all access is by `(user_id, name)`.
///
/// The plan document travels as text and is cast to/from the json column in
/// SQL, which keeps the stored bytes exactly as serialized.
pub struct SavedPlan;

impl SavedPlan {
    pub async fn exists(db: &PgPool, user_id: Uuid, name: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM saved_plans WHERE user_id = $1 AND name = $2")
                .bind(user_id)
                .bind(name)
                .fetch_optional(db)
                .await?;
        Ok(row.is_some())
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        plan_document: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO saved_plans (user_id, name, plan)
            VALUES ($1, $2, $3::json)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(plan_document)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn list_names(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT name
            FROM saved_plans
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn fetch_plan(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT plan::text
            FROM saved_plans
            WHERE user_id = $1 AND name = $2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|(plan,)| plan))
    }

    /// Idempotent: deleting a name that does not exist is not an error.
    pub async fn delete(db: &PgPool, user_id: Uuid, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM saved_plans WHERE user_id = $1 AND name = $2")
            .bind(user_id)
            .bind(name)
            .execute(db)
            .await?;
        Ok(())
    }
}
