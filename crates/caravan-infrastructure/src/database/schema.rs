//! Schema bootstrap
//!
//! Tenant databases are created on demand when a company is provisioned, so
//! the schema ships as idempotent statements instead of a migration chain.
//! Running bootstrap against an already-initialized database is a no-op.

use sqlx::PgPool;
use tracing::info;

use caravan_core::error::DomainError;

const PLATFORM_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id              CHAR(24) PRIMARY KEY,
        name            VARCHAR(100) NOT NULL UNIQUE,
        slug            VARCHAR(100) NOT NULL UNIQUE,
        description     TEXT,
        primary_color   VARCHAR(16),
        contact_email   TEXT,
        contact_phone   TEXT,
        contact_address TEXT,
        db_uri          TEXT NOT NULL,
        db_name         TEXT NOT NULL UNIQUE,
        is_active       BOOLEAN NOT NULL DEFAULT TRUE,
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    USERS_TABLE,
];

// Platform users are the super admins; tenant users are agents and company
// admins. Same shape in both scopes.
const USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id            CHAR(24) PRIMARY KEY,
        name          VARCHAR(100) NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          VARCHAR(20) NOT NULL,
        phone         TEXT,
        is_active     BOOLEAN NOT NULL DEFAULT TRUE,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL
    )
    "#;

const TENANT_TABLES: &[&str] = &[
    USERS_TABLE,
    r#"
    CREATE TABLE IF NOT EXISTS bookings (
        id                  CHAR(24) PRIMARY KEY,
        customer_name       VARCHAR(100) NOT NULL,
        customer_email      TEXT NOT NULL,
        contact_number      TEXT NOT NULL,
        passengers          INTEGER NOT NULL,
        adults              INTEGER NOT NULL,
        children            INTEGER NOT NULL,
        package             TEXT NOT NULL,
        package_price       DOUBLE PRECISION NOT NULL,
        additional_services TEXT[] NOT NULL DEFAULT '{}',
        total_amount        DOUBLE PRECISION NOT NULL,
        payment_method      VARCHAR(20) NOT NULL,
        date                TIMESTAMPTZ NOT NULL,
        departure_date      TIMESTAMPTZ NOT NULL,
        return_date         TIMESTAMPTZ NOT NULL,
        flight              JSONB NOT NULL DEFAULT '{}',
        hotel               JSONB NOT NULL DEFAULT '{}',
        visa                JSONB NOT NULL DEFAULT '{}',
        transport           JSONB NOT NULL DEFAULT '{}',
        payment             JSONB NOT NULL DEFAULT '{}',
        state               VARCHAR(20) NOT NULL,
        agent_id            CHAR(24) NOT NULL,
        customer_group      TEXT,
        created_at          TIMESTAMPTZ NOT NULL,
        updated_at          TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_bookings_agent ON bookings (agent_id, created_at DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inquiries (
        id              CHAR(24) PRIMARY KEY,
        name            VARCHAR(100) NOT NULL,
        email           TEXT NOT NULL,
        phone           TEXT,
        subject         TEXT NOT NULL,
        message         TEXT NOT NULL,
        priority        VARCHAR(10) NOT NULL,
        status          VARCHAR(10) NOT NULL,
        approval_status VARCHAR(10) NOT NULL,
        assigned_agent  CHAR(24),
        related_booking CHAR(24),
        created_at      TIMESTAMPTZ NOT NULL,
        updated_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    // BIGSERIAL keeps arrival order without trusting clock resolution.
    r#"
    CREATE TABLE IF NOT EXISTS inquiry_responses (
        id         BIGSERIAL PRIMARY KEY,
        inquiry_id CHAR(24) NOT NULL REFERENCES inquiries (id) ON DELETE CASCADE,
        responder  CHAR(24) NOT NULL,
        message    TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_inquiry_responses_inquiry
        ON inquiry_responses (inquiry_id, id)
    "#,
];

/// Ensure the platform database (companies + super admins) exists.
pub async fn bootstrap_platform(pool: &PgPool) -> Result<(), DomainError> {
    run(pool, PLATFORM_TABLES).await?;
    info!("platform schema ready");
    Ok(())
}

/// Ensure a freshly created tenant database has its tables.
pub async fn bootstrap_tenant(pool: &PgPool) -> Result<(), DomainError> {
    run(pool, TENANT_TABLES).await?;
    info!("tenant schema ready");
    Ok(())
}

async fn run(pool: &PgPool, statements: &[&str]) -> Result<(), DomainError> {
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
    }
    Ok(())
}
