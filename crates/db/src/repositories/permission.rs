use chrono::{NaiveDate, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};

use hort_core::models::permission::NewPermissionRequest;

use crate::models::{DbPermission, DbPermissionView};

const PERMISSION_WITH_COLLECTOR: &str = r#"
    SELECT p.id, p.student_id, p.kind, p.collector_id, p.main_collector,
           p.valid_from, p.valid_until, p.allowed_from_time,
           p.allowed_monday, p.allowed_tuesday, p.allowed_wednesday,
           p.allowed_thursday, p.allowed_friday,
           p.status, p.created_at,
           c.first_name AS collector_first_name,
           c.last_name AS collector_last_name,
           c.address AS collector_address,
           c.phone AS collector_phone
    FROM permissions p
    LEFT JOIN collectors c ON c.id = p.collector_id
"#;

/// Creates a permission from a validated request. Pickup rights insert the
/// embedded collector and the permission row in one transaction.
pub async fn create_permission(
    pool: &Pool<Postgres>,
    request: &NewPermissionRequest,
) -> Result<i64> {
    tracing::debug!(
        "Creating permission: student_id={}, kind={}, can_leave_alone={}",
        request.student_id,
        request.kind,
        request.can_leave_alone
    );

    let mut tx = pool.begin().await?;

    let collector_id = match &request.collector {
        Some(collector) => {
            let id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO collectors (first_name, last_name, address, phone)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&collector.first_name)
            .bind(&collector.last_name)
            .bind(&collector.address)
            .bind(&collector.phone)
            .fetch_one(&mut *tx)
            .await?;
            Some(id)
        }
        None => None,
    };

    let weekly = request.normalized_weekly();

    let permission_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO permissions (
            student_id, kind, collector_id, main_collector,
            valid_from, valid_until, allowed_from_time,
            allowed_monday, allowed_tuesday, allowed_wednesday,
            allowed_thursday, allowed_friday,
            status, created_at
        )
        VALUES ($1, $2, $3, FALSE, $4, $5, $6, $7, $8, $9, $10, $11, 'ACTIVE', $12)
        RETURNING id
        "#,
    )
    .bind(request.student_id)
    .bind(request.permission_kind())
    .bind(collector_id)
    .bind(request.valid_from)
    .bind(request.valid_until)
    .bind(request.allowed_from_time)
    .bind(weekly.and_then(|w| w.monday))
    .bind(weekly.and_then(|w| w.tuesday))
    .bind(weekly.and_then(|w| w.wednesday))
    .bind(weekly.and_then(|w| w.thursday))
    .bind(weekly.and_then(|w| w.friday))
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Permission created successfully: id={}", permission_id);
    Ok(permission_id)
}

/// Permission listing joined with student, group, and collector data.
/// `active_only` filters to `status = 'ACTIVE'`; ordering is insertion
/// order (ascending id).
pub async fn list_permission_views(
    pool: &Pool<Postgres>,
    active_only: bool,
) -> Result<Vec<DbPermissionView>> {
    tracing::debug!("Listing permissions: active_only={}", active_only);

    let views = sqlx::query_as::<_, DbPermissionView>(
        r#"
        SELECT p.id AS permission_id,
               p.kind AS permission_kind,
               p.student_id,
               s.first_name AS student_first_name,
               s.last_name AS student_last_name,
               g.name AS student_group_name,
               p.collector_id,
               c.first_name AS collector_first_name,
               c.last_name AS collector_last_name,
               c.phone AS collector_phone,
               p.valid_from, p.valid_until, p.allowed_from_time, p.status
        FROM permissions p
        JOIN students s ON s.id = p.student_id
        LEFT JOIN groups g ON g.id = s.group_id
        LEFT JOIN collectors c ON c.id = p.collector_id
        WHERE ($1 = FALSE OR p.status = 'ACTIVE')
        ORDER BY p.id
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(views)
}

/// Active permissions for one student whose validity window contains the
/// given calendar date (missing bounds are open-ended).
pub async fn get_active_permissions_for_date(
    pool: &Pool<Postgres>,
    student_id: i64,
    date: NaiveDate,
) -> Result<Vec<DbPermission>> {
    tracing::debug!(
        "Fetching active permissions: student_id={}, date={}",
        student_id,
        date
    );

    let query = format!(
        "{PERMISSION_WITH_COLLECTOR}
        WHERE p.student_id = $1
          AND p.status = 'ACTIVE'
          AND (p.valid_from IS NULL OR p.valid_from::date <= $2)
          AND (p.valid_until IS NULL OR p.valid_until::date >= $2)
        ORDER BY p.id"
    );

    let permissions = sqlx::query_as::<_, DbPermission>(&query)
        .bind(student_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

    Ok(permissions)
}

/// Idempotent `ACTIVE -> INACTIVE` transition. Returns `false` when no
/// permission with the id exists; deactivating an already inactive record
/// succeeds as a no-op.
pub async fn deactivate_permission(pool: &Pool<Postgres>, id: i64) -> Result<bool> {
    tracing::debug!("Deactivating permission: id={}", id);

    let updated = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE permissions
        SET status = 'INACTIVE'
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(updated.is_some())
}
