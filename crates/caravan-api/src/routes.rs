//! HTTP router

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{agents, auth, bookings, companies, health, inquiries};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/me", get(auth::me));

    let booking_routes = Router::new()
        .route("/", post(bookings::create).get(bookings::list))
        .route("/my", get(bookings::list_mine))
        .route(
            "/{id}",
            get(bookings::get).put(bookings::update).delete(bookings::delete),
        )
        .route("/{id}/snapshot", get(bookings::snapshot))
        .route("/{id}/approve", put(bookings::approve))
        .route("/{id}/reject", put(bookings::reject));

    let inquiry_routes = Router::new()
        .route("/", post(inquiries::create).get(inquiries::list))
        .route(
            "/{id}",
            get(inquiries::get)
                .put(inquiries::update)
                .delete(inquiries::delete),
        )
        .route("/{id}/respond", post(inquiries::respond))
        .route("/{id}/approve", put(inquiries::approve))
        .route("/{id}/reject", put(inquiries::reject));

    let agent_routes = Router::new()
        .route("/", get(agents::list))
        .route(
            "/{id}",
            get(agents::get).put(agents::update).delete(agents::delete),
        )
        .route("/{id}/performance", get(agents::performance));

    let company_routes = Router::new()
        .route("/", post(companies::create).get(companies::list))
        .route("/{id}", get(companies::get))
        .route("/{id}/deactivate", put(companies::deactivate));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/inquiries", inquiry_routes)
        .nest("/api/agents", agent_routes)
        .nest("/api/companies", company_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
