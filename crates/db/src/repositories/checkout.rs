use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};

use crate::models::DbCheckoutEvent;

pub async fn get_checkout_event(
    pool: &Pool<Postgres>,
    student_id: i64,
    date: NaiveDate,
) -> Result<Option<DbCheckoutEvent>> {
    tracing::debug!(
        "Getting checkout event: student_id={}, date={}",
        student_id,
        date
    );

    let event = sqlx::query_as::<_, DbCheckoutEvent>(
        r#"
        SELECT id, student_id, checkout_date, method, collector_id,
               permission_id, comment, confirmed_at
        FROM checkout_events
        WHERE student_id = $1 AND checkout_date = $2
        "#,
    )
    .bind(student_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

/// Inserts the checkout event for (student, date). Returns `None` when an
/// event already exists: the `ON CONFLICT DO NOTHING` against the
/// `one_checkout_per_day` constraint is what resolves two concurrent
/// confirmations into exactly one success, so callers must treat `None`
/// as "already checked out", not retry.
pub async fn insert_checkout_event(
    pool: &Pool<Postgres>,
    student_id: i64,
    date: NaiveDate,
    method: &str,
    collector_id: Option<i64>,
    permission_id: Option<i64>,
    comment: Option<&str>,
) -> Result<Option<DbCheckoutEvent>> {
    tracing::debug!(
        "Inserting checkout event: student_id={}, date={}, method={}",
        student_id,
        date,
        method
    );

    let event = sqlx::query_as::<_, DbCheckoutEvent>(
        r#"
        INSERT INTO checkout_events (
            student_id, checkout_date, method, collector_id,
            permission_id, comment, confirmed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (student_id, checkout_date) DO NOTHING
        RETURNING id, student_id, checkout_date, method, collector_id,
                  permission_id, comment, confirmed_at
        "#,
    )
    .bind(student_id)
    .bind(date)
    .bind(method)
    .bind(collector_id)
    .bind(permission_id)
    .bind(comment)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    if event.is_none() {
        tracing::debug!(
            "Checkout event already exists: student_id={}, date={}",
            student_id,
            date
        );
    }

    Ok(event)
}
