//! Agent / user HTTP handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use caravan_core::domain::{AgentPerformance, Oid, RecentBooking, Role};
use caravan_core::error::DomainError;
use caravan_core::services::{UserChanges, UserService};

use crate::error::ApiError;
use crate::extractors::{AuthUser, TenantContext};
use crate::handlers::auth::UserDto;
use crate::handlers::stores;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBookingDto {
    pub id: String,
    pub customer: String,
    pub amount: f64,
    pub date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDto {
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub monthly_bookings: u64,
    pub monthly_revenue: f64,
    pub recent_bookings: Vec<RecentBookingDto>,
}

impl From<RecentBooking> for RecentBookingDto {
    fn from(r: RecentBooking) -> Self {
        Self {
            id: r.id.to_string(),
            customer: r.customer,
            amount: r.amount,
            date: r.date,
        }
    }
}

impl From<AgentPerformance> for PerformanceDto {
    fn from(p: AgentPerformance) -> Self {
        Self {
            total_bookings: p.total_bookings,
            total_revenue: p.total_revenue,
            monthly_bookings: p.monthly_bookings,
            monthly_revenue: p.monthly_revenue,
            recent_bookings: p
                .recent_bookings
                .into_iter()
                .map(RecentBookingDto::from)
                .collect(),
        }
    }
}

async fn service(state: &AppState, company_id: &Oid) -> Result<UserService, ApiError> {
    let stores = stores(state, company_id).await?;
    Ok(UserService::new(stores.users, stores.bookings))
}

fn parse_id(raw: &str) -> Result<Oid, ApiError> {
    Oid::parse(raw).map_err(ApiError::from)
}

/// GET /api/agents
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let users = service.list(&principal).await?;
    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /api/agents/{id}
pub async fn get(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let user = service.get(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// PUT /api/agents/{id}
pub async fn update(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let role = payload
        .role
        .as_deref()
        .map(|r| Role::from_str(r).ok_or_else(|| DomainError::validation("role: unknown value")))
        .transpose()?;
    let changes = UserChanges {
        name: payload.name,
        email: payload.email,
        phone: payload.phone.map(Some),
        password: payload.password,
        role,
        is_active: payload.is_active,
    };
    let service = service(&state, &tenant.company_id).await?;
    let user = service.update(&principal, &parse_id(&id)?, changes).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// DELETE /api/agents/{id}
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

/// GET /api/agents/{id}/performance
pub async fn performance(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PerformanceDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let perf = service.performance(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(perf.into())))
}
