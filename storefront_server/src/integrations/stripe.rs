use std::collections::BTreeMap;

use log::*;
use storefront_engine::{
    checkout_objects::{CheckoutRequest, CheckoutSession, PaymentStatus},
    db_types::{Money, SessionId},
    traits::{PaymentProviderError, PaymentSessionProvider},
};
use stripe_tools::{
    CheckoutSession as StripeCheckoutSession,
    NewCheckoutSession,
    NewLineItem,
    StripeApi,
    StripeApiError,
};

use crate::config::PaymentConfig;

/// [`PaymentSessionProvider`] backed by Stripe Checkout.
#[derive(Clone)]
pub struct StripeSessionProvider {
    api: StripeApi,
    currency: String,
    success_url: String,
    cancel_url: String,
}

impl StripeSessionProvider {
    pub fn new(config: &PaymentConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config.stripe.clone())?;
        Ok(Self {
            api,
            currency: config.currency.clone(),
            success_url: config.success_url(),
            cancel_url: config.cancel_url(),
        })
    }

    fn new_checkout_session(&self, request: CheckoutRequest) -> NewCheckoutSession {
        let line_items = request
            .line_items
            .into_iter()
            .map(|item| NewLineItem {
                name: item.name,
                image_url: item.image_url,
                unit_amount: item.unit_amount.value(),
                quantity: item.quantity,
            })
            .collect();
        NewCheckoutSession {
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
            currency: self.currency.clone(),
            customer_email: request.customer_email,
            line_items,
            metadata: request.metadata,
        }
    }
}

impl PaymentSessionProvider for StripeSessionProvider {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, PaymentProviderError> {
        let params = self.new_checkout_session(request);
        let session = self.api.create_checkout_session(&params).await.map_err(provider_error)?;
        debug!("💳️ Stripe opened checkout session {}", session.id);
        checkout_session_from_stripe(session)
    }

    async fn fetch_checkout_session(&self, session_id: &SessionId) -> Result<CheckoutSession, PaymentProviderError> {
        let session = self.api.fetch_checkout_session(session_id.as_str()).await.map_err(provider_error)?;
        trace!("💳️ Stripe reports session {} as {}", session.id, session.payment_status);
        checkout_session_from_stripe(session)
    }
}

fn provider_error(e: StripeApiError) -> PaymentProviderError {
    warn!("💳️ Stripe request failed. {e}");
    match e {
        StripeApiError::RequestError(s) | StripeApiError::Initialization(s) => PaymentProviderError::Unreachable(s),
        StripeApiError::QueryError { status, message } => PaymentProviderError::Rejected { status, message },
        StripeApiError::JsonError(s) | StripeApiError::RestResponseError(s) => {
            PaymentProviderError::InvalidResponse(s)
        },
    }
}

/// Converts Stripe's view of a checkout session into the engine's.
pub fn checkout_session_from_stripe(session: StripeCheckoutSession) -> Result<CheckoutSession, PaymentProviderError> {
    let payment_status = match session.payment_status.as_str() {
        "paid" => PaymentStatus::Paid,
        "unpaid" => PaymentStatus::Unpaid,
        "no_payment_required" => PaymentStatus::NoPaymentRequired,
        other => {
            return Err(PaymentProviderError::InvalidResponse(format!(
                "Session {} has an unknown payment status '{other}'",
                session.id
            )))
        },
    };
    Ok(CheckoutSession {
        id: SessionId::from(session.id),
        payment_status,
        amount_total: session.amount_total.map(Money::from),
        metadata: session.metadata.unwrap_or_else(BTreeMap::new),
        url: session.url,
    })
}
