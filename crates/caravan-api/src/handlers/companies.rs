//! Company (tenant) HTTP handlers — platform scope

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use caravan_core::domain::{Company, ContactInfo, Oid};
use caravan_core::services::NewCompany;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_address: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    pub admin_name: String,
    pub admin_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_address: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Company> for CompanyDto {
    fn from(c: Company) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name,
            slug: c.slug,
            description: c.description,
            primary_color: c.primary_color,
            contact_email: c.contact.email,
            contact_phone: c.contact.phone,
            contact_address: c.contact.address,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

/// Creation response; the generated admin credentials are shown exactly
/// once, in this payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCompanyDto {
    pub company: CompanyDto,
    pub admin_email: String,
    pub admin_password: String,
}

fn parse_id(raw: &str) -> Result<Oid, ApiError> {
    Oid::parse(raw).map_err(ApiError::from)
}

/// POST /api/companies
pub async fn create(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<CompanyRequest>,
) -> Result<Json<ApiResponse<CreatedCompanyDto>>, ApiError> {
    let created = state
        .company_service
        .create(
            &principal,
            NewCompany {
                name: payload.name,
                description: payload.description,
                contact: ContactInfo {
                    email: payload.contact_email,
                    phone: payload.contact_phone,
                    address: payload.contact_address,
                },
                primary_color: payload.primary_color,
                admin_name: payload.admin_name,
                admin_email: payload.admin_email,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(CreatedCompanyDto {
        company: created.company.into(),
        admin_email: created.admin_email,
        admin_password: created.admin_password,
    })))
}

/// GET /api/companies
pub async fn list(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<CompanyDto>>>, ApiError> {
    let companies = state.company_service.list(&principal).await?;
    Ok(Json(ApiResponse::success(
        companies.into_iter().map(CompanyDto::from).collect(),
    )))
}

/// GET /api/companies/{id}
pub async fn get(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompanyDto>>, ApiError> {
    let company = state
        .company_service
        .get(&principal, &parse_id(&id)?)
        .await?;
    Ok(Json(ApiResponse::success(company.into())))
}

/// PUT /api/companies/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompanyDto>>, ApiError> {
    let id = parse_id(&id)?;
    let company = state.company_service.deactivate(&principal, &id).await?;
    // Drop any cached connection so in-flight tokens stop resolving.
    state.registry.evict(&id).await;
    Ok(Json(ApiResponse::success(company.into())))
}
