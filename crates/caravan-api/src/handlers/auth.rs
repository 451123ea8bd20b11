//! Authentication HTTP handlers (login, register, current user)

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use caravan_core::domain::{Oid, User};
use caravan_core::error::DomainError;
use caravan_core::services::AuthService;
use caravan_shared::constants::{COMPANY_ID_HEADER, COMPANY_ID_QUERY};

use crate::error::ApiError;
use crate::extractors::{AuthUser, TenantContext};
use crate::handlers::stores;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            phone: user.phone,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserDto,
    pub access_token: String,
}

/// Build an auth service for either scope: a tenant's user store when a
/// tenant id is given, the platform store (super admins) otherwise.
async fn auth_scope(
    state: &AppState,
    company_id: Option<Oid>,
) -> Result<AuthService, ApiError> {
    match company_id {
        Some(company_id) => {
            let stores = stores(state, &company_id).await?;
            Ok(AuthService::new(
                stores.users,
                state.jwt.clone(),
                Some(company_id),
            ))
        }
        None => Ok(AuthService::new(
            state.platform_users.clone(),
            state.jwt.clone(),
            None,
        )),
    }
}

fn optional_tenant(
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> Result<Option<Oid>, ApiError> {
    let raw = headers
        .get(COMPANY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| params.get(COMPANY_ID_QUERY).cloned());
    raw.map(|r| {
        Oid::parse(&r).map_err(|_| {
            ApiError(DomainError::validation("companyId: malformed identifier"))
        })
    })
    .transpose()
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let company_id = optional_tenant(&headers, &params)?;
    let auth = auth_scope(&state, company_id).await?;
    let result = auth.login(&payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::success(AuthResponse {
        user: result.user.into(),
        access_token: result.access_token,
    })))
}

/// POST /api/auth/register — agent self-registration within a tenant.
pub async fn register(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let auth = auth_scope(&state, Some(tenant.company_id)).await?;
    let result = auth
        .register_agent(&payload.name, &payload.email, &payload.password, payload.phone)
        .await?;
    Ok(Json(ApiResponse::success(AuthResponse {
        user: result.user.into(),
        access_token: result.access_token,
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let auth = auth_scope(&state, principal.company_id.clone()).await?;
    let user = auth.current_user(&principal.id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}
