use axum::{
    Router,
    routing::{get, post},
};

use boxoffice_core::health::healthz;
use boxoffice_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    availability::{get_event_availability, get_package_availability, list_seats},
    health::readyz,
    holds::{create_seat_hold, release_seat_hold},
    orders::{cancel_order, confirm_order, create_order, get_order, quote_order, refund_order},
    tickets::check_in_ticket,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Availability
        .route(
            "/packages/{package_id}/availability",
            get(get_package_availability),
        )
        .route(
            "/events/{event_id}/availability",
            get(get_event_availability),
        )
        .route("/events/{event_id}/seats", get(list_seats))
        // Seat holds
        .route(
            "/events/{event_id}/seat-holds",
            post(create_seat_hold).delete(release_seat_hold),
        )
        // Orders
        .route("/orders/quote", post(quote_order))
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/confirmation", post(confirm_order))
        .route("/orders/{order_id}/cancellation", post(cancel_order))
        .route("/orders/{order_id}/refund", post(refund_order))
        // Check-in
        .route("/tickets/{ticket_id}/check-in", post(check_in_ticket))
        .with_state(state)
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
