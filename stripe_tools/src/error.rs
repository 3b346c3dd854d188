use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the Stripe API: {0}")]
    RequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookSignatureError {
    #[error("The signature header is missing or could not be parsed. {0}")]
    MalformedHeader(String),
    #[error("The signature header does not contain a v1 signature")]
    NoSignature,
    #[error("The event timestamp is outside the tolerance window ({age}s old)")]
    StaleTimestamp { age: i64 },
    #[error("The webhook signing secret cannot be used as an HMAC key")]
    InvalidSecret,
    #[error("No signature matched the payload")]
    SignatureMismatch,
}
