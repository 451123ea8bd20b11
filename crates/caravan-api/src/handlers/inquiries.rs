//! Inquiry HTTP handlers
//!
//! Creation is public (the website contact form posts here); everything
//! else requires a bearer token.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use caravan_core::domain::{Inquiry, InquiryResponse, InquiryStatus, Oid, Priority};
use caravan_core::error::DomainError;
use caravan_core::services::{AuthService, InquiryChanges, InquiryService, NewInquiry};

use crate::error::ApiError;
use crate::extractors::{AuthUser, TenantContext};
use crate::handlers::stores;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub related_booking: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// Present-but-null clears the assignment.
    #[serde(default, with = "double_option")]
    pub assigned_agent: Option<Option<String>>,
}

// Distinguishes an absent field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto {
    pub responder: String,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<InquiryResponse> for ResponseDto {
    fn from(r: InquiryResponse) -> Self {
        Self {
            responder: r.responder.to_string(),
            message: r.message,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDto {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub priority: String,
    pub status: String,
    pub approval_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_booking: Option<String>,
    pub responses: Vec<ResponseDto>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Inquiry> for InquiryDto {
    fn from(i: Inquiry) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name,
            email: i.email,
            phone: i.phone,
            subject: i.subject,
            message: i.message,
            priority: i.priority.as_str().to_string(),
            status: i.status.as_str().to_string(),
            approval_status: i.approval_status.as_str().to_string(),
            assigned_agent: i.assigned_agent.map(|a| a.to_string()),
            related_booking: i.related_booking.map(|b| b.to_string()),
            responses: i.responses.into_iter().map(ResponseDto::from).collect(),
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

async fn service(state: &AppState, company_id: &Oid) -> Result<InquiryService, ApiError> {
    let stores = stores(state, company_id).await?;
    Ok(InquiryService::new(
        stores.inquiries,
        state.dispatcher.clone(),
    ))
}

fn parse_id(raw: &str) -> Result<Oid, ApiError> {
    Oid::parse(raw).map_err(ApiError::from)
}

/// POST /api/inquiries — public intake, no bearer token.
pub async fn create(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<InquiryRequest>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    let priority = match payload.priority.as_deref() {
        Some(p) => {
            Priority::from_str(p).ok_or_else(|| DomainError::validation("priority: unknown value"))?
        }
        None => Priority::default(),
    };
    let related_booking = payload
        .related_booking
        .as_deref()
        .map(parse_id)
        .transpose()?;
    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service
        .create(NewInquiry {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            subject: payload.subject,
            message: payload.message,
            priority,
            related_booking,
        })
        .await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// GET /api/inquiries
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<InquiryDto>>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let inquiries = service.list(&principal).await?;
    Ok(Json(ApiResponse::success(
        inquiries.into_iter().map(InquiryDto::from).collect(),
    )))
}

/// GET /api/inquiries/{id}
pub async fn get(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service.get(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// PUT /api/inquiries/{id}
pub async fn update(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<InquiryUpdateRequest>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    let status = payload
        .status
        .as_deref()
        .map(|s| {
            InquiryStatus::from_str(s)
                .ok_or_else(|| DomainError::validation("status: unknown value"))
        })
        .transpose()?;
    let priority = payload
        .priority
        .as_deref()
        .map(|p| {
            Priority::from_str(p).ok_or_else(|| DomainError::validation("priority: unknown value"))
        })
        .transpose()?;
    let assigned_agent = match payload.assigned_agent {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) => Some(Some(parse_id(&raw)?)),
    };
    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service
        .update(
            &principal,
            &parse_id(&id)?,
            InquiryChanges {
                status,
                priority,
                assigned_agent,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// POST /api/inquiries/{id}/respond
pub async fn respond(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<RespondRequest>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    // The customer-facing reply is signed with the responder's name.
    let stores = stores(&state, &tenant.company_id).await?;
    let auth = AuthService::new(
        stores.users.clone(),
        state.jwt.clone(),
        Some(tenant.company_id.clone()),
    );
    let responder = auth.current_user(&principal.id).await?;

    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service
        .respond(&principal, &parse_id(&id)?, payload.message, &responder.name)
        .await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// PUT /api/inquiries/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service.approve(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// PUT /api/inquiries/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InquiryDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let inquiry = service.reject(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(inquiry.into())))
}

/// DELETE /api/inquiries/{id}
pub async fn delete(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    service.delete(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(())))
}
