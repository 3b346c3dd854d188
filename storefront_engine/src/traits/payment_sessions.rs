use thiserror::Error;

use crate::{
    checkout_objects::{CheckoutRequest, CheckoutSession},
    db_types::SessionId,
};

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("The payment provider could not be reached. {0}")]
    Unreachable(String),
    #[error("The payment provider rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment provider sent a response that could not be understood. {0}")]
    InvalidResponse(String),
}

/// A hosted-checkout payment processor.
///
/// Implementations make a single attempt per call. Retrying is left to whoever triggered the call (the browser for
/// confirmation polls, the provider itself for webhooks).
#[allow(async_fn_in_trait)]
pub trait PaymentSessionProvider {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, PaymentProviderError>;

    async fn fetch_checkout_session(&self, session_id: &SessionId) -> Result<CheckoutSession, PaymentProviderError>;
}
