//! # Stripe tools
//!
//! A small client for the parts of the Stripe API that the storefront uses:
//! * creating hosted Checkout sessions ([`StripeApi::create_checkout_session`]),
//! * retrieving a session by id ([`StripeApi::fetch_checkout_session`]),
//! * verifying the `Stripe-Signature` header on incoming webhook events ([`verify_webhook_signature`]).
mod api;
mod config;
mod error;

mod data_objects;
mod webhook;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    CheckoutSession,
    NewCheckoutSession,
    NewLineItem,
    WebhookEvent,
    WebhookEventData,
    CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED,
    CHECKOUT_SESSION_COMPLETED,
};
pub use error::{StripeApiError, WebhookSignatureError};
pub use webhook::{compute_signature, verify_webhook_signature, verify_webhook_signature_at, SIGNATURE_HEADER};
