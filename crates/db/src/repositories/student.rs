use eyre::Result;
use sqlx::{Pool, Postgres};

use hort_core::models::registry::StudentOnboardingRequest;

use crate::models::{DbCollector, DbStudentWithGroup};

/// Searches students by name substring (case-insensitive, matches first or
/// last name) and/or group. Both filters optional.
pub async fn search_students(
    pool: &Pool<Postgres>,
    name: Option<&str>,
    group_id: Option<i64>,
) -> Result<Vec<DbStudentWithGroup>> {
    tracing::debug!("Searching students: name={:?}, group_id={:?}", name, group_id);

    let pattern = name.map(|n| format!("%{n}%"));

    let students = sqlx::query_as::<_, DbStudentWithGroup>(
        r#"
        SELECT s.id, s.first_name, s.last_name, s.address, s.phone,
               g.name AS group_name
        FROM students s
        LEFT JOIN groups g ON g.id = s.group_id
        WHERE ($1::text IS NULL OR s.first_name ILIKE $1 OR s.last_name ILIKE $1)
          AND ($2::bigint IS NULL OR s.group_id = $2)
        ORDER BY s.last_name, s.first_name
        "#,
    )
    .bind(pattern)
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// The collectors currently holding an active pickup right for a student.
pub async fn get_active_collectors(
    pool: &Pool<Postgres>,
    student_id: i64,
) -> Result<Vec<DbCollector>> {
    let collectors = sqlx::query_as::<_, DbCollector>(
        r#"
        SELECT DISTINCT c.id, c.first_name, c.last_name, c.address, c.phone, c.created_at
        FROM collectors c
        JOIN permissions p ON p.collector_id = c.id
        WHERE p.student_id = $1 AND p.kind = 'COLLECTOR' AND p.status = 'ACTIVE'
        ORDER BY c.id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(collectors)
}

/// Onboards a student: the student row, and one collector + pickup right
/// per onboarding collector, all in a single transaction.
pub async fn create_student_with_collectors(
    pool: &Pool<Postgres>,
    request: &StudentOnboardingRequest,
) -> Result<DbStudentWithGroup> {
    tracing::debug!(
        "Onboarding student: name={} {}, group_id={}, collectors={}",
        request.student.first_name,
        request.student.last_name,
        request.group_id,
        request.collectors.len()
    );

    let mut tx = pool.begin().await?;

    let student_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO students (first_name, last_name, address, phone, group_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&request.student.first_name)
    .bind(&request.student.last_name)
    .bind(&request.student.address)
    .bind(&request.student.phone)
    .bind(request.group_id)
    .fetch_one(&mut *tx)
    .await?;

    for collector in &request.collectors {
        let collector_id = sqlx::query_scalar::<_, i64>(
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

        sqlx::query(
            r#"
            INSERT INTO permissions (
                student_id, kind, collector_id, main_collector,
                valid_from, valid_until, status
            )
            VALUES ($1, 'COLLECTOR', $2, $3, $4, $5, 'ACTIVE')
            "#,
        )
        .bind(student_id)
        .bind(collector_id)
        .bind(collector.main_collector)
        .bind(collector.valid_from)
        .bind(collector.valid_until)
        .execute(&mut *tx)
        .await?;
    }

    let student = sqlx::query_as::<_, DbStudentWithGroup>(
        r#"
        SELECT s.id, s.first_name, s.last_name, s.address, s.phone,
               g.name AS group_name
        FROM students s
        LEFT JOIN groups g ON g.id = s.group_id
        WHERE s.id = $1
        "#,
    )
    .bind(student_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Student onboarded successfully: id={}", student.id);
    Ok(student)
}
