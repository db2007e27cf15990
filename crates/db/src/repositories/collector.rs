use eyre::Result;
use sqlx::{Pool, Postgres};

use crate::models::DbCollector;

pub async fn list_collectors(pool: &Pool<Postgres>) -> Result<Vec<DbCollector>> {
    let collectors = sqlx::query_as::<_, DbCollector>(
        r#"
        SELECT id, first_name, last_name, address, phone, created_at
        FROM collectors
        ORDER BY last_name, first_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(collectors)
}
