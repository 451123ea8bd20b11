//! Booking HTTP handlers

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use caravan_core::domain::{
    Booking, BookingDraft, BookingState, FlightDetails, HotelDetails, Oid, PaymentMethod,
    TransportDetails, VisaDetails,
};
use caravan_core::error::DomainError;
use caravan_core::repositories::BookingFilter;
use caravan_core::services::{BookingChanges, BookingService};

use crate::error::ApiError;
use crate::extractors::{AuthUser, TenantContext};
use crate::handlers::stores;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub contact_number: String,
    pub passengers: i32,
    pub adults: i32,
    pub children: i32,
    pub package: String,
    pub package_price: f64,
    #[serde(default)]
    pub additional_services: Vec<String>,
    pub total_amount: f64,
    pub payment_method: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub departure_date: chrono::DateTime<chrono::Utc>,
    pub return_date: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub flight: FlightDetails,
    #[serde(default)]
    pub hotel: HotelDetails,
    #[serde(default)]
    pub visa: VisaDetails,
    #[serde(default)]
    pub transport: TransportDetails,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub cardholder_name: Option<String>,
    #[serde(default)]
    pub card_expiry: Option<String>,
}

impl BookingRequest {
    fn into_draft(self) -> Result<BookingDraft, DomainError> {
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .ok_or_else(|| DomainError::validation("paymentMethod: unknown value"))?;
        Ok(BookingDraft {
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            contact_number: self.contact_number,
            passengers: self.passengers,
            adults: self.adults,
            children: self.children,
            package: self.package,
            package_price: self.package_price,
            additional_services: self.additional_services,
            total_amount: self.total_amount,
            payment_method,
            date: self.date,
            departure_date: self.departure_date,
            return_date: self.return_date,
            flight: self.flight,
            hotel: self.hotel,
            visa: self.visa,
            transport: self.transport,
            card_number: self.card_number,
            cardholder_name: self.cardholder_name,
            card_expiry: self.card_expiry,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdateRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Operational status string; admin-only.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub contact_number: String,
    pub passengers: i32,
    pub adults: i32,
    pub children: i32,
    pub package: String,
    pub package_price: f64,
    pub additional_services: Vec<String>,
    pub total_amount: f64,
    pub payment_method: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub departure_date: chrono::DateTime<chrono::Utc>,
    pub return_date: chrono::DateTime<chrono::Utc>,
    pub flight: FlightDetails,
    pub hotel: HotelDetails,
    pub visa: VisaDetails,
    pub transport: TransportDetails,
    pub payment: caravan_core::domain::PaymentInfo,
    pub status: String,
    pub approval_status: String,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_group: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.to_string(),
            customer_name: b.customer_name,
            customer_email: b.customer_email,
            contact_number: b.contact_number,
            passengers: b.passengers,
            adults: b.adults,
            children: b.children,
            package: b.package,
            package_price: b.package_price,
            additional_services: b.additional_services,
            total_amount: b.total_amount,
            payment_method: b.payment_method.as_str().to_string(),
            date: b.date,
            departure_date: b.departure_date,
            return_date: b.return_date,
            flight: b.flight,
            hotel: b.hotel,
            visa: b.visa,
            transport: b.transport,
            payment: b.payment,
            status: b.state.status().to_string(),
            approval_status: b.state.approval_status().to_string(),
            agent_id: b.agent_id.to_string(),
            customer_group: b.customer_group,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

async fn service(state: &AppState, company_id: &Oid) -> Result<BookingService, ApiError> {
    let stores = stores(state, company_id).await?;
    Ok(BookingService::new(
        stores.bookings,
        state.dispatcher.clone(),
    ))
}

fn parse_id(raw: &str) -> Result<Oid, ApiError> {
    Oid::parse(raw).map_err(ApiError::from)
}

/// POST /api/bookings
pub async fn create(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.create(&principal, payload.into_draft()?).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// GET /api/bookings?status=&agent=
pub async fn list(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let mut filter = BookingFilter::default();
    if let Some(status) = params.get("status") {
        filter.state = Some(
            BookingState::from_status(status)
                .ok_or_else(|| DomainError::validation("status: unknown value"))?,
        );
    }
    if let Some(agent) = params.get("agent") {
        filter.agent_id = Some(parse_id(agent)?);
    }
    let service = service(&state, &tenant.company_id).await?;
    let bookings = service.list(&principal, filter).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

/// GET /api/bookings/my
pub async fn list_mine(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let bookings = service.list_mine(&principal).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

/// GET /api/bookings/{id}
pub async fn get(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.get(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// GET /api/bookings/{id}/snapshot
pub async fn snapshot(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.snapshot(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// PUT /api/bookings/{id}
pub async fn update(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<BookingUpdateRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let status = payload
        .status
        .as_deref()
        .map(|s| {
            BookingState::from_status(s)
                .ok_or_else(|| DomainError::validation("status: unknown value"))
        })
        .transpose()?;
    let changes = BookingChanges {
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        status,
    };
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.update(&principal, &parse_id(&id)?, changes).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// DELETE /api/bookings/{id}
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

/// PUT /api/bookings/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.approve(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

/// PUT /api/bookings/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    tenant: TenantContext,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError> {
    let service = service(&state, &tenant.company_id).await?;
    let booking = service.reject(&principal, &parse_id(&id)?).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}
