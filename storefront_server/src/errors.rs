use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use storefront_engine::{AuthApiError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Payment has not been completed.")]
    PaymentIncomplete,
    #[error("{0}")]
    PaymentProviderError(String),
    #[error("Order details unavailable.")]
    OrderDetailsUnavailable,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentIncomplete => StatusCode::PAYMENT_REQUIRED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentProviderError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OrderDetailsUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No identity token was provided.")]
    MissingToken,
    #[error("Identity token is invalid. {0}")]
    ValidationError(String),
    #[error("Identity token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient permissions. {0}")]
    InsufficientPermissions(String),
    #[error("User {0} not found.")]
    AccountNotFound(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::UserNotFound(uid) => Self::AuthenticationError(AuthError::AccountNotFound(uid)),
            AuthApiError::RoleNotAllowed(_) => {
                Self::AuthenticationError(AuthError::InsufficientPermissions(e.to_string()))
            },
            AuthApiError::InvalidUser(s) => Self::ValidationError(s),
            AuthApiError::StoreError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::ValidationError(_) | OrderFlowError::InvalidRequestError(_) => {
                Self::ValidationError(e.to_string())
            },
            OrderFlowError::PaymentIncompleteError(_) => Self::PaymentIncomplete,
            OrderFlowError::PaymentProviderError(e) => Self::PaymentProviderError(e.to_string()),
            OrderFlowError::MetadataCorruptError { session, reason } => {
                error!("💻️ Session {session} cannot be turned into an order. {reason}");
                Self::OrderDetailsUnavailable
            },
            OrderFlowError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id} not found.")),
            OrderFlowError::StoreError(e) => Self::BackendError(e.to_string()),
        }
    }
}
