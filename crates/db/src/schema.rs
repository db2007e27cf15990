use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Index statements executed individually during initialization; prepared
/// statements carry a single command each.
pub const INDEX_STATEMENTS: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_students_group_id ON students(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_students_last_name ON students(last_name)",
    "CREATE INDEX IF NOT EXISTS idx_permissions_student_id ON permissions(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_permissions_status ON permissions(status)",
    "CREATE INDEX IF NOT EXISTS idx_permissions_collector_id ON permissions(collector_id)",
    "CREATE INDEX IF NOT EXISTS idx_checkout_events_student_id ON checkout_events(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_checkout_events_date ON checkout_events(checkout_date)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create groups table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS groups (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create students table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            first_name VARCHAR(255) NOT NULL,
            last_name VARCHAR(255) NOT NULL,
            address VARCHAR(512) NULL,
            phone VARCHAR(64) NULL,
            group_id BIGINT NULL REFERENCES groups(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create collectors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collectors (
            id BIGSERIAL PRIMARY KEY,
            first_name VARCHAR(255) NOT NULL,
            last_name VARCHAR(255) NOT NULL,
            address VARCHAR(512) NULL,
            phone VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create permissions table. Validity bounds are naive local datetimes,
    // clock-time thresholds are TIME columns.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS permissions (
            id BIGSERIAL PRIMARY KEY,
            student_id BIGINT NOT NULL REFERENCES students(id),
            kind VARCHAR(32) NOT NULL,
            collector_id BIGINT NULL REFERENCES collectors(id),
            main_collector BOOLEAN NOT NULL DEFAULT FALSE,
            valid_from TIMESTAMP NULL,
            valid_until TIMESTAMP NULL,
            allowed_from_time TIME NULL,
            allowed_monday TIME NULL,
            allowed_tuesday TIME NULL,
            allowed_wednesday TIME NULL,
            allowed_thursday TIME NULL,
            allowed_friday TIME NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'ACTIVE',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT permission_kind CHECK (kind IN ('COLLECTOR', 'SELF_DISMISSAL')),
            CONSTRAINT permission_status CHECK (status IN ('ACTIVE', 'INACTIVE')),
            CONSTRAINT collector_required CHECK (kind <> 'COLLECTOR' OR collector_id IS NOT NULL),
            CONSTRAINT valid_window CHECK (
                valid_from IS NULL OR valid_until IS NULL OR valid_from <= valid_until
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create checkout_events table. The UNIQUE (student_id, checkout_date)
    // constraint is what makes a second confirmation for the same day fail
    // instead of overwriting, even under concurrent requests.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS checkout_events (
            id BIGSERIAL PRIMARY KEY,
            student_id BIGINT NOT NULL REFERENCES students(id),
            checkout_date DATE NOT NULL,
            method VARCHAR(16) NOT NULL,
            collector_id BIGINT NULL REFERENCES collectors(id),
            permission_id BIGINT NULL REFERENCES permissions(id),
            comment TEXT NULL,
            confirmed_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT checkout_method CHECK (method IN ('COLLECTOR', 'SELF')),
            CONSTRAINT one_checkout_per_day UNIQUE (student_id, checkout_date)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes. One statement per query: the prepared-statement
    // protocol rejects multi-command strings.
    for statement in INDEX_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
