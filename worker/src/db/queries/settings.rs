//! Settings database queries
//!
//! Settings live as a single JSONB document so the shape can evolve
//! without migrations. Unknown fields fall back to defaults on read.

use anyhow::Result;
use sqlx::PgPool;

use crate::types::ScheduleSettings;

/// Load the settings document, if one has been saved.
pub async fn get_settings(pool: &PgPool) -> Result<Option<ScheduleSettings>> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT data FROM schedule_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    match row {
        Some((data,)) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Save the settings document, replacing any previous one.
pub async fn save_settings(pool: &PgPool, settings: &ScheduleSettings) -> Result<()> {
    let data = serde_json::to_value(settings)?;

    sqlx::query(
        r#"
        INSERT INTO schedule_settings (id, data, updated_at)
        VALUES (1, $1, NOW())
        ON CONFLICT (id) DO UPDATE SET
            data = EXCLUDED.data,
            updated_at = NOW()
        "#,
    )
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}
