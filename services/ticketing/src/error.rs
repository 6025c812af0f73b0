use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use boxoffice_core::error::ServiceError;
use boxoffice_domain::error::AdmissionError;

/// Ticketing service error variants.
#[derive(Debug, thiserror::Error)]
pub enum TicketingServiceError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),
    #[error("event not found")]
    EventNotFound,
    #[error("package not found")]
    PackageNotFound,
    #[error("seat not found")]
    SeatNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("ticket not found")]
    TicketNotFound,
    #[error("promotion not found")]
    PromoNotFound,
    #[error("missing data")]
    MissingData,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl TicketingServiceError {
    /// The admission rejection carried by this error, if any.
    pub fn admission(&self) -> Option<AdmissionError> {
        match self {
            Self::Admission(e) => Some(*e),
            _ => None,
        }
    }
}

impl ServiceError for TicketingServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Admission(e) => match e {
                AdmissionError::NotAvailable => "NOT_AVAILABLE",
                AdmissionError::ExpiredWindow => "EXPIRED_WINDOW",
                AdmissionError::CapacityExceeded => "CAPACITY_EXCEEDED",
                AdmissionError::InvalidTransition => "INVALID_TRANSITION",
                AdmissionError::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
                AdmissionError::PromoIneligible => "PROMO_INELIGIBLE",
                AdmissionError::InvalidQuantity => "INVALID_QUANTITY",
            },
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::PackageNotFound => "PACKAGE_NOT_FOUND",
            Self::SeatNotFound => "SEAT_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::PromoNotFound => "PROMO_NOT_FOUND",
            Self::MissingData => "MISSING_DATA",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Admission(e) => match e {
                AdmissionError::NotAvailable
                | AdmissionError::CapacityExceeded
                | AdmissionError::InvalidTransition
                | AdmissionError::AlreadyCheckedIn => StatusCode::CONFLICT,
                AdmissionError::ExpiredWindow | AdmissionError::PromoIneligible => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AdmissionError::InvalidQuantity => StatusCode::BAD_REQUEST,
            },
            Self::EventNotFound
            | Self::PackageNotFound
            | Self::SeatNotFound
            | Self::OrderNotFound
            | Self::TicketNotFound
            | Self::PromoNotFound => StatusCode::NOT_FOUND,
            Self::MissingData => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TicketingServiceError {
    fn into_response(self) -> Response {
        self.json_response()
    }
}
