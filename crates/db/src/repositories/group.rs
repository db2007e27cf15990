use eyre::Result;
use sqlx::{Pool, Postgres};

use crate::models::DbGroup;

pub async fn list_groups(pool: &Pool<Postgres>) -> Result<Vec<DbGroup>> {
    let groups = sqlx::query_as::<_, DbGroup>(
        r#"
        SELECT id, name, created_at
        FROM groups
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

pub async fn get_group_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<DbGroup>> {
    tracing::debug!("Getting group by id: {}", id);

    let group = sqlx::query_as::<_, DbGroup>(
        r#"
        SELECT id, name, created_at
        FROM groups
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(group)
}
