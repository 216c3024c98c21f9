use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "users, profiles, jobs, applications",
        sql: r#"
CREATE TABLE IF NOT EXISTS gm.users (
    id BIGSERIAL PRIMARY KEY,
    role TEXT NOT NULL CHECK (role IN ('worker', 'organizer')),
    rating_avg DOUBLE PRECISION,
    reliability_score DOUBLE PRECISION,
    last_active_date TIMESTAMPTZ,
    completed_jobs_count INTEGER NOT NULL DEFAULT 0,
    no_show_count INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS gm.profiles (
    user_id BIGINT PRIMARY KEY REFERENCES gm.users(id) ON DELETE CASCADE,
    skills TEXT[] NOT NULL DEFAULT '{}',
    lat DOUBLE PRECISION,
    lng DOUBLE PRECISION,
    availability_windows JSONB NOT NULL DEFAULT '[]'::jsonb
);

CREATE TABLE IF NOT EXISTS gm.jobs (
    id BIGSERIAL PRIMARY KEY,
    organizer_id BIGINT NOT NULL REFERENCES gm.users(id),
    title TEXT NOT NULL DEFAULT '',
    required_skills TEXT[] NOT NULL DEFAULT '{}',
    lat DOUBLE PRECISION,
    lng DOUBLE PRECISION,
    date_start TIMESTAMPTZ NOT NULL,
    date_end TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_job_window CHECK (date_end > date_start)
);

CREATE TABLE IF NOT EXISTS gm.applications (
    id BIGSERIAL PRIMARY KEY,
    job_id BIGINT NOT NULL REFERENCES gm.jobs(id),
    pro_id BIGINT NOT NULL REFERENCES gm.users(id),
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'accepted', 'declined', 'completed', 'no-show')),
    check_in_timestamps JSONB NOT NULL DEFAULT '[]'::jsonb,
    hours_worked DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (job_id, pro_id)
);

CREATE INDEX IF NOT EXISTS idx_users_role ON gm.users(role, id);
CREATE INDEX IF NOT EXISTS idx_applications_pro_status ON gm.applications(pro_id, status);
CREATE INDEX IF NOT EXISTS idx_jobs_open_start ON gm.jobs(date_start) WHERE status = 'open';
"#,
    },
    Migration {
        id: 2,
        description: "range checks on user counters and scores",
        sql: r#"
DO $$
BEGIN
    IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'chk_user_counters') THEN
        ALTER TABLE gm.users
            ADD CONSTRAINT chk_user_counters
            CHECK (completed_jobs_count >= 0 AND no_show_count >= 0);
    END IF;

    IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = 'chk_reliability_range') THEN
        ALTER TABLE gm.users
            ADD CONSTRAINT chk_reliability_range
            CHECK (reliability_score IS NULL OR (reliability_score >= 0.0 AND reliability_score <= 1.0));
    END IF;
END $$;
"#,
    },
];

/// Apply pending migrations, each in its own transaction. Safe to run on
/// every start.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS gm;
             CREATE TABLE IF NOT EXISTS gm.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM gm.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO gm.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}
