//! Request extractors: bearer principal and tenant context

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use caravan_core::authz::Principal;
use caravan_core::domain::{Oid, Role};
use caravan_core::error::DomainError;
use caravan_shared::constants::{COMPANY_ID_HEADER, COMPANY_ID_QUERY};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated principal from the `Authorization: Bearer` header.
pub struct AuthUser(pub Principal);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn principal_from_token(state: &AppState, token: &str) -> Result<Principal, DomainError> {
    let claims = state
        .jwt
        .validate_token(token)
        .map_err(|_| DomainError::Unauthenticated)?;
    let id = Oid::parse(&claims.sub).map_err(|_| DomainError::Unauthenticated)?;
    let role = Role::from_str(&claims.role).ok_or(DomainError::Unauthenticated)?;
    let company_id = claims
        .company
        .as_deref()
        .map(Oid::parse)
        .transpose()
        .map_err(|_| DomainError::Unauthenticated)?;
    Ok(Principal {
        id,
        role,
        company_id,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError(DomainError::Unauthenticated))?;
        Ok(AuthUser(principal_from_token(state, token)?))
    }
}

/// Tenant the request operates on. Resolution order: `x-company-id` header,
/// `companyId` query parameter, then the principal's company claim. Absent
/// on a tenant-scoped route is a validation failure, not a fallback to any
/// default tenant.
pub struct TenantContext {
    pub company_id: Oid,
}

fn query_param<'a>(parts: &'a Parts, key: &str) -> Option<&'a str> {
    parts
        .uri
        .query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(COMPANY_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        let raw = from_header.or_else(|| query_param(parts, COMPANY_ID_QUERY));

        if let Some(raw) = raw {
            let company_id = Oid::parse(raw)
                .map_err(|_| DomainError::validation("companyId: malformed identifier"))?;
            return Ok(TenantContext { company_id });
        }

        if let Some(token) = bearer_token(parts) {
            if let Ok(principal) = principal_from_token(state, token) {
                if let Some(company_id) = principal.company_id {
                    return Ok(TenantContext { company_id });
                }
            }
        }

        Err(ApiError(DomainError::validation(
            "companyId: tenant context is required",
        )))
    }
}
