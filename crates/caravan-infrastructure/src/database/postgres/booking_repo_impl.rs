//! PostgreSQL booking repository (tenant database)
//!
//! Structured itinerary details (flight, hotel, visa, transport, payment)
//! are stored as JSONB; the combined operational/approval state is stored
//! as its operational status string, which determines both halves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use caravan_core::domain::{
    Booking, BookingState, FlightDetails, HotelDetails, Oid, PaymentInfo, PaymentMethod,
    TransportDetails, VisaDetails,
};
use caravan_core::error::DomainError;
use caravan_core::repositories::{BookingFilter, BookingRepository};

use super::parse_oid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct BookingRow {
    id: String,
    customer_name: String,
    customer_email: String,
    contact_number: String,
    passengers: i32,
    adults: i32,
    children: i32,
    package: String,
    package_price: f64,
    additional_services: Vec<String>,
    total_amount: f64,
    payment_method: String,
    date: DateTime<Utc>,
    departure_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    flight: Json<FlightDetails>,
    hotel: Json<HotelDetails>,
    visa: Json<VisaDetails>,
    transport: Json<TransportDetails>,
    payment: Json<PaymentInfo>,
    state: String,
    agent_id: String,
    customer_group: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let state = BookingState::from_status(&row.state)
            .ok_or_else(|| DomainError::Database(format!("unknown booking state: {}", row.state)))?;
        Ok(Booking {
            id: parse_oid(&row.id)?,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            contact_number: row.contact_number,
            passengers: row.passengers,
            adults: row.adults,
            children: row.children,
            package: row.package,
            package_price: row.package_price,
            additional_services: row.additional_services,
            total_amount: row.total_amount,
            payment_method: PaymentMethod::from_str(&row.payment_method).unwrap_or_default(),
            date: row.date,
            departure_date: row.departure_date,
            return_date: row.return_date,
            flight: row.flight.0,
            hotel: row.hotel.0,
            visa: row.visa.0,
            transport: row.transport.0,
            payment: row.payment.0,
            state,
            agent_id: parse_oid(&row.agent_id)?,
            customer_group: row.customer_group,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = r#"
    id, customer_name, customer_email, contact_number,
    passengers, adults, children,
    package, package_price, additional_services, total_amount, payment_method,
    date, departure_date, return_date,
    flight, hotel, visa, transport, payment,
    state, agent_id, customer_group, created_at, updated_at
"#;

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_by_id(&self, id: &Oid) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking by id: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.map(Booking::try_from).transpose()
    }

    async fn list(&self, filter: BookingFilter) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE ($1::VARCHAR IS NULL OR state = $1)
              AND ($2::CHAR(24) IS NULL OR agent_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.state.map(|s| s.status()))
        .bind(filter.agent_id.as_ref().map(|a| a.as_str().to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings: {}", e);
            DomainError::Database(e.to_string())
        })?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_by_agent(&self, agent_id: &Oid) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE agent_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(agent_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings by agent: {}", e);
            DomainError::Database(e.to_string())
        })?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn create(&self, booking: &Booking) -> Result<Booking, DomainError> {
        info!("Creating booking: {}", booking.id);

        let row: BookingRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO bookings (
                id, customer_name, customer_email, contact_number,
                passengers, adults, children,
                package, package_price, additional_services, total_amount, payment_method,
                date, departure_date, return_date,
                flight, hotel, visa, transport, payment,
                state, agent_id, customer_group, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id.as_str())
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.contact_number)
        .bind(booking.passengers)
        .bind(booking.adults)
        .bind(booking.children)
        .bind(&booking.package)
        .bind(booking.package_price)
        .bind(&booking.additional_services)
        .bind(booking.total_amount)
        .bind(booking.payment_method.as_str())
        .bind(booking.date)
        .bind(booking.departure_date)
        .bind(booking.return_date)
        .bind(Json(&booking.flight))
        .bind(Json(&booking.hotel))
        .bind(Json(&booking.visa))
        .bind(Json(&booking.transport))
        .bind(Json(&booking.payment))
        .bind(booking.state.status())
        .bind(booking.agent_id.as_str())
        .bind(&booking.customer_group)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating booking: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.try_into()
    }

    async fn update(&self, booking: &Booking) -> Result<Booking, DomainError> {
        let row: BookingRow = sqlx::query_as(&format!(
            r#"
            UPDATE bookings
            SET
                customer_name = $2,
                customer_email = $3,
                contact_number = $4,
                passengers = $5,
                adults = $6,
                children = $7,
                package = $8,
                package_price = $9,
                additional_services = $10,
                total_amount = $11,
                payment_method = $12,
                date = $13,
                departure_date = $14,
                return_date = $15,
                flight = $16,
                hotel = $17,
                visa = $18,
                transport = $19,
                payment = $20,
                state = $21,
                customer_group = $22,
                updated_at = $23
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id.as_str())
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.contact_number)
        .bind(booking.passengers)
        .bind(booking.adults)
        .bind(booking.children)
        .bind(&booking.package)
        .bind(booking.package_price)
        .bind(&booking.additional_services)
        .bind(booking.total_amount)
        .bind(booking.payment_method.as_str())
        .bind(booking.date)
        .bind(booking.departure_date)
        .bind(booking.return_date)
        .bind(Json(&booking.flight))
        .bind(Json(&booking.hotel))
        .bind(Json(&booking.visa))
        .bind(Json(&booking.transport))
        .bind(Json(&booking.payment))
        .bind(booking.state.status())
        .bind(&booking.customer_group)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.try_into()
    }

    async fn delete(&self, id: &Oid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting booking: {}", e);
                DomainError::Database(e.to_string())
            })?;
        Ok(())
    }
}
