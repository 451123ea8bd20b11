//! PostgreSQL inquiry repository (tenant database)
//!
//! Responses live in a separate append-only table keyed by a serial id, so
//! the thread always reads back in arrival order.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use caravan_core::domain::{
    ApprovalStatus, Inquiry, InquiryResponse, InquiryStatus, Oid, Priority,
};
use caravan_core::error::DomainError;
use caravan_core::repositories::InquiryRepository;

use super::parse_oid;

pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn responses_for(
        &self,
        inquiry_ids: &[String],
    ) -> Result<HashMap<String, Vec<InquiryResponse>>, DomainError> {
        if inquiry_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ResponseRow> = sqlx::query_as(
            r#"
            SELECT inquiry_id, responder, message, created_at
            FROM inquiry_responses
            WHERE inquiry_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(inquiry_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading inquiry responses: {}", e);
            DomainError::Database(e.to_string())
        })?;

        let mut grouped: HashMap<String, Vec<InquiryResponse>> = HashMap::new();
        for row in rows {
            let response = InquiryResponse {
                responder: parse_oid(&row.responder)?,
                message: row.message,
                created_at: row.created_at,
            };
            grouped
                .entry(row.inquiry_id.trim().to_string())
                .or_default()
                .push(response);
        }
        Ok(grouped)
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct InquiryRow {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    priority: String,
    status: String,
    approval_status: String,
    assigned_agent: Option<String>,
    related_booking: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ResponseRow {
    inquiry_id: String,
    responder: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl InquiryRow {
    fn into_inquiry(self, responses: Vec<InquiryResponse>) -> Result<Inquiry, DomainError> {
        Ok(Inquiry {
            id: parse_oid(&self.id)?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            message: self.message,
            priority: Priority::from_str(&self.priority).unwrap_or_default(),
            status: InquiryStatus::from_str(&self.status).unwrap_or_default(),
            approval_status: ApprovalStatus::from_str(&self.approval_status).unwrap_or_default(),
            assigned_agent: self.assigned_agent.as_deref().map(parse_oid).transpose()?,
            related_booking: self.related_booking.as_deref().map(parse_oid).transpose()?,
            responses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const INQUIRY_COLUMNS: &str = r#"
    id, name, email, phone, subject, message,
    priority, status, approval_status,
    assigned_agent, related_booking, created_at, updated_at
"#;

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Inquiry>, DomainError> {
        let row: Option<InquiryRow> = sqlx::query_as(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding inquiry by id: {}", e);
            DomainError::Database(e.to_string())
        })?;

        let Some(row) = row else { return Ok(None) };
        let mut grouped = self.responses_for(&[id.as_str().to_string()]).await?;
        let responses = grouped.remove(id.as_str()).unwrap_or_default();
        Ok(Some(row.into_inquiry(responses)?))
    }

    async fn list(&self, assigned_to: Option<Oid>) -> Result<Vec<Inquiry>, DomainError> {
        let rows: Vec<InquiryRow> = sqlx::query_as(&format!(
            r#"
            SELECT {INQUIRY_COLUMNS} FROM inquiries
            WHERE ($1::CHAR(24) IS NULL OR assigned_agent = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(assigned_to.as_ref().map(|a| a.as_str().to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing inquiries: {}", e);
            DomainError::Database(e.to_string())
        })?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.trim().to_string()).collect();
        let mut grouped = self.responses_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let responses = grouped.remove(row.id.trim()).unwrap_or_default();
                row.into_inquiry(responses)
            })
            .collect()
    }

    async fn create(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError> {
        info!("Creating inquiry: {}", inquiry.id);

        let row: InquiryRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO inquiries (
                id, name, email, phone, subject, message,
                priority, status, approval_status,
                assigned_agent, related_booking, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {INQUIRY_COLUMNS}
            "#
        ))
        .bind(inquiry.id.as_str())
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.phone)
        .bind(&inquiry.subject)
        .bind(&inquiry.message)
        .bind(inquiry.priority.as_str())
        .bind(inquiry.status.as_str())
        .bind(inquiry.approval_status.as_str())
        .bind(inquiry.assigned_agent.as_ref().map(|a| a.as_str().to_string()))
        .bind(inquiry.related_booking.as_ref().map(|b| b.as_str().to_string()))
        .bind(inquiry.created_at)
        .bind(inquiry.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating inquiry: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.into_inquiry(Vec::new())
    }

    async fn update(&self, inquiry: &Inquiry) -> Result<Inquiry, DomainError> {
        let row: InquiryRow = sqlx::query_as(&format!(
            r#"
            UPDATE inquiries
            SET
                name = $2,
                email = $3,
                phone = $4,
                subject = $5,
                message = $6,
                priority = $7,
                status = $8,
                approval_status = $9,
                assigned_agent = $10,
                related_booking = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING {INQUIRY_COLUMNS}
            "#
        ))
        .bind(inquiry.id.as_str())
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.phone)
        .bind(&inquiry.subject)
        .bind(&inquiry.message)
        .bind(inquiry.priority.as_str())
        .bind(inquiry.status.as_str())
        .bind(inquiry.approval_status.as_str())
        .bind(inquiry.assigned_agent.as_ref().map(|a| a.as_str().to_string()))
        .bind(inquiry.related_booking.as_ref().map(|b| b.as_str().to_string()))
        .bind(inquiry.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating inquiry: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.into_inquiry(inquiry.responses.clone())
    }

    async fn append_response(
        &self,
        inquiry_id: &Oid,
        response: &InquiryResponse,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO inquiry_responses (inquiry_id, responder, message, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(inquiry_id.as_str())
        .bind(response.responder.as_str())
        .bind(&response.message)
        .bind(response.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error appending inquiry response: {}", e);
            DomainError::Database(e.to_string())
        })?;
        Ok(())
    }

    async fn delete(&self, id: &Oid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting inquiry: {}", e);
                DomainError::Database(e.to_string())
            })?;
        Ok(())
    }
}
