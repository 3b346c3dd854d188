use thiserror::Error;

use crate::{
    db_types::{OrderId, Role, SessionId},
    traits::{PaymentProviderError, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid order. {0}")]
    ValidationError(String),
    #[error("Invalid request. {0}")]
    InvalidRequestError(String),
    #[error("Payment provider error. {0}")]
    PaymentProviderError(#[from] PaymentProviderError),
    #[error("Payment for session {0} has not completed")]
    PaymentIncompleteError(SessionId),
    #[error("Order details for session {session} are unavailable. {reason}")]
    MetadataCorruptError { session: SessionId, reason: String },
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Store error. {0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Store error. {0}")]
    StoreError(#[from] StoreError),
    #[error("User {0} is not registered")]
    UserNotFound(String),
    #[error("This action requires the {0} role")]
    RoleNotAllowed(Role),
    #[error("Invalid user details. {0}")]
    InvalidUser(String),
}
