//! PostgreSQL company repository (platform database)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use caravan_core::domain::{Company, ConnectionDescriptor, ContactInfo, Oid};
use caravan_core::error::DomainError;
use caravan_core::repositories::CompanyRepository;

use super::parse_oid;

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct CompanyRow {
    id: String,
    name: String,
    slug: String,
    description: Option<String>,
    primary_color: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    contact_address: Option<String>,
    db_uri: String,
    db_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = DomainError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: parse_oid(&row.id)?,
            name: row.name,
            slug: row.slug,
            description: row.description,
            primary_color: row.primary_color,
            contact: ContactInfo {
                email: row.contact_email,
                phone: row.contact_phone,
                address: row.contact_address,
            },
            database: ConnectionDescriptor {
                uri: row.db_uri,
                db_name: row.db_name,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COMPANY_COLUMNS: &str = r#"
    id, name, slug, description, primary_color,
    contact_email, contact_phone, contact_address,
    db_uri, db_name, is_active, created_at, updated_at
"#;

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding company by id: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.map(Company::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding company by name: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.map(Company::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let rows: Vec<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing companies: {}", e);
            DomainError::Database(e.to_string())
        })?;

        rows.into_iter().map(Company::try_from).collect()
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        info!("Registering company: {}", company.slug);

        let row: CompanyRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO companies (
                id, name, slug, description, primary_color,
                contact_email, contact_phone, contact_address,
                db_uri, db_name, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(company.id.as_str())
        .bind(&company.name)
        .bind(&company.slug)
        .bind(&company.description)
        .bind(&company.primary_color)
        .bind(&company.contact.email)
        .bind(&company.contact.phone)
        .bind(&company.contact.address)
        .bind(&company.database.uri)
        .bind(&company.database.db_name)
        .bind(company.is_active)
        .bind(company.created_at)
        .bind(company.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating company: {}", e);
            let msg = e.to_string();
            if msg.contains("unique") || msg.contains("duplicate") {
                DomainError::validation("name: already registered")
            } else {
                DomainError::Database(msg)
            }
        })?;

        row.try_into()
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let row: CompanyRow = sqlx::query_as(&format!(
            r#"
            UPDATE companies
            SET
                name = $2,
                description = $3,
                primary_color = $4,
                contact_email = $5,
                contact_phone = $6,
                contact_address = $7,
                is_active = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(company.id.as_str())
        .bind(&company.name)
        .bind(&company.description)
        .bind(&company.primary_color)
        .bind(&company.contact.email)
        .bind(&company.contact.phone)
        .bind(&company.contact.address)
        .bind(company.is_active)
        .bind(company.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating company: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.try_into()
    }
}
