use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reserva_booking::BookingError;
use reserva_catalog::listing::CatalogError;
use reserva_chat::ChatError;
use reserva_core::repository::RepoError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn booking(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_) => AppError::NotFound(err.to_string()),
            BookingError::InvalidTransition { .. }
            | BookingError::SlotFull { .. }
            | BookingError::AlreadyReviewed => AppError::Conflict(err.to_string()),
            BookingError::NotListingVendor | BookingError::NotBookingCustomer => {
                AppError::Authorization(err.to_string())
            }
            BookingError::UnitUnavailable
            | BookingError::UnitNotInListing
            | BookingError::BookingNotCompleted
            | BookingError::InvalidRating(_)
            | BookingError::UnknownStatus(_) => AppError::Validation(err.to_string()),
        }
    }

    pub fn chat(err: ChatError) -> Self {
        match err {
            ChatError::ConversationNotFound(_) | ChatError::UserNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ChatError::NotParticipant { .. } => AppError::Authorization(err.to_string()),
            ChatError::SelfConversation | ChatError::EmptyMessage => {
                AppError::Validation(err.to_string())
            }
        }
    }

    pub fn catalog(err: CatalogError) -> Self {
        match err {
            CatalogError::ListingNotFound(_) | CatalogError::UnitNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::NotListingVendor { .. } => AppError::Authorization(err.to_string()),
            CatalogError::MissingField(_)
            | CatalogError::InvalidPrice(_)
            | CatalogError::InvalidCapacity(_)
            | CatalogError::UnknownListingType(_)
            | CatalogError::UnknownUnitType(_) => AppError::Validation(err.to_string()),
        }
    }

    /// Map a repository error onto an HTTP-shaped one, unboxing the domain
    /// errors the store lets bubble through.
    pub fn repo(err: RepoError) -> Self {
        let err = match err.downcast::<BookingError>() {
            Ok(e) => return Self::booking(*e),
            Err(err) => err,
        };
        let err = match err.downcast::<ChatError>() {
            Ok(e) => return Self::chat(*e),
            Err(err) => err,
        };
        let err = match err.downcast::<CatalogError>() {
            Ok(e) => return Self::catalog(*e),
            Err(err) => err,
        };

        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let slot_full = AppError::booking(BookingError::SlotFull {
            booked: 2,
            capacity: 2,
        });
        assert!(matches!(slot_full, AppError::Conflict(_)));

        let not_vendor = AppError::booking(BookingError::NotListingVendor);
        assert!(matches!(not_vendor, AppError::Authorization(_)));

        let missing = AppError::chat(ChatError::ConversationNotFound(Uuid::new_v4()));
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[test]
    fn test_boxed_domain_error_is_unwrapped() {
        let boxed: RepoError = Box::new(BookingError::AlreadyReviewed);
        assert!(matches!(AppError::repo(boxed), AppError::Conflict(_)));

        let opaque: RepoError = "connection reset".into();
        assert!(matches!(AppError::repo(opaque), AppError::Internal(_)));
    }
}
