use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::draw::DrawError;
use crate::models::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    fn draw_status(err: &DrawError) -> (StatusCode, &'static str) {
        match err {
            DrawError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DrawError::TicketNotRegistered(_) => (StatusCode::NOT_FOUND, "TICKET_NOT_REGISTERED"),
            DrawError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            DrawError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DrawError::TicketNotPaid { .. } => (StatusCode::BAD_REQUEST, "TICKET_NOT_PAID"),
            DrawError::NoEligibleTickets { .. } => {
                (StatusCode::BAD_REQUEST, "NO_ELIGIBLE_TICKETS")
            }
            DrawError::AlreadyManualWinner(_) => (StatusCode::CONFLICT, "ALREADY_MANUAL_WINNER"),
            DrawError::StoreFailure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Draw(err) => Self::draw_status(err).0,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::Draw(DrawError::StoreFailure(err)) => {
                log::error!("Store failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            AppError::Draw(err) => {
                let (status, code) = Self::draw_status(err);
                log::warn!("Draw rejected ({code}): {err}");
                (status, code, err.to_string())
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("Invalid token: {err}");
                (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    "Invalid access token".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(ApiResponse::error(error_code, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TicketStatus;

    #[test]
    fn test_draw_error_status_mapping() {
        let cases = [
            (DrawError::NotFound("Raffle not found".into()), 404),
            (DrawError::TicketNotRegistered(9), 404),
            (DrawError::Forbidden, 403),
            (DrawError::InvalidInput("x".into()), 400),
            (
                DrawError::TicketNotPaid {
                    number: 4,
                    status: TicketStatus::Revisando,
                },
                400,
            ),
            (DrawError::NoEligibleTickets { require_paid: true }, 400),
            (DrawError::AlreadyManualWinner(4), 409),
            (
                DrawError::StoreFailure(sea_orm::DbErr::Custom("boom".into())),
                500,
            ),
        ];
        for (err, status) in cases {
            let app: AppError = err.into();
            assert_eq!(app.status_code().as_u16(), status, "{app}");
            assert_eq!(app.error_response().status().as_u16(), status);
        }
    }

    #[test]
    fn test_auth_error_is_unauthorized() {
        let err = AppError::AuthError("Missing access token".into());
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
