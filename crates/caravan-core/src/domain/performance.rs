//! Agent performance aggregates
//!
//! Derived on demand from the agent's booking set; recomputing over the
//! same snapshot always yields the same figures. Not stored.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::domain::{Booking, Oid};

#[derive(Debug, Clone, Serialize)]
pub struct RecentBooking {
    pub id: Oid,
    pub customer: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentPerformance {
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub monthly_bookings: u64,
    pub monthly_revenue: f64,
    pub recent_bookings: Vec<RecentBooking>,
}

impl AgentPerformance {
    /// Aggregate over a booking snapshot. `now` anchors the monthly window.
    pub fn from_bookings(bookings: &[Booking], now: DateTime<Utc>) -> Self {
        let total_bookings = bookings.len() as u64;
        let total_revenue: f64 = bookings.iter().map(|b| b.total_amount).sum();

        let in_current_month = |b: &&Booking| {
            b.created_at.month() == now.month() && b.created_at.year() == now.year()
        };
        let monthly_bookings = bookings.iter().filter(in_current_month).count() as u64;
        let monthly_revenue: f64 = bookings
            .iter()
            .filter(in_current_month)
            .map(|b| b.total_amount)
            .sum();

        let mut recent: Vec<&Booking> = bookings.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_bookings = recent
            .into_iter()
            .take(5)
            .map(|b| RecentBooking {
                id: b.id.clone(),
                customer: b.customer_name.clone(),
                amount: b.total_amount,
                date: b.created_at,
            })
            .collect();

        Self {
            total_bookings,
            total_revenue,
            monthly_bookings,
            monthly_revenue,
            recent_bookings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{
        BookingDraft, FlightDetails, HotelDetails, PaymentMethod, TransportDetails, VisaDetails,
    };
    use chrono::{Duration, TimeZone};

    fn booking(amount: f64, created_at: DateTime<Utc>) -> Booking {
        let draft = BookingDraft {
            customer_name: "Customer".into(),
            customer_email: "customer@example.com".into(),
            contact_number: "123456789".into(),
            passengers: 1,
            adults: 1,
            children: 0,
            package: "Economy Umrah".into(),
            package_price: amount,
            additional_services: vec![],
            total_amount: amount,
            payment_method: PaymentMethod::Cash,
            date: created_at,
            departure_date: created_at + Duration::days(30),
            return_date: created_at + Duration::days(44),
            flight: FlightDetails::default(),
            hotel: HotelDetails::default(),
            visa: VisaDetails::default(),
            transport: TransportDetails::default(),
            card_number: None,
            cardholder_name: None,
            card_expiry: None,
        };
        let mut b = Booking::create(draft, Oid::new()).unwrap();
        b.created_at = created_at;
        b
    }

    #[test]
    fn test_aggregates_are_idempotent() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let bookings = vec![
            booking(1000.0, now - Duration::days(2)),
            booking(2000.0, now - Duration::days(60)),
        ];
        let first = AgentPerformance::from_bookings(&bookings, now);
        let second = AgentPerformance::from_bookings(&bookings, now);
        assert_eq!(first.total_bookings, second.total_bookings);
        assert_eq!(first.total_revenue, second.total_revenue);
        assert_eq!(first.monthly_revenue, second.monthly_revenue);
    }

    #[test]
    fn test_monthly_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let bookings = vec![
            booking(1000.0, now - Duration::days(2)),  // this month
            booking(2000.0, now - Duration::days(60)), // older
        ];
        let perf = AgentPerformance::from_bookings(&bookings, now);
        assert_eq!(perf.total_bookings, 2);
        assert_eq!(perf.total_revenue, 3000.0);
        assert_eq!(perf.monthly_bookings, 1);
        assert_eq!(perf.monthly_revenue, 1000.0);
    }

    #[test]
    fn test_recent_caps_at_five_newest_first() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let bookings: Vec<Booking> = (0..7)
            .map(|i| booking(100.0 * f64::from(i + 1), now - Duration::days(i64::from(i))))
            .collect();
        let perf = AgentPerformance::from_bookings(&bookings, now);
        assert_eq!(perf.recent_bookings.len(), 5);
        assert_eq!(perf.recent_bookings[0].amount, 100.0);
        assert!(perf
            .recent_bookings
            .windows(2)
            .all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_empty_snapshot() {
        let perf = AgentPerformance::from_bookings(&[], Utc::now());
        assert_eq!(perf.total_bookings, 0);
        assert_eq!(perf.total_revenue, 0.0);
        assert!(perf.recent_bookings.is_empty());
    }
}
