use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StripeApiError;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";

//--------------------------------------    CheckoutSession    ---------------------------------------------------------
/// The subset of the Stripe Checkout Session object that the storefront cares about.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    /// One of `paid`, `unpaid` or `no_payment_required`
    #[serde(default)]
    pub payment_status: String,
    /// One of `open`, `complete` or `expired`
    #[serde(default)]
    pub status: Option<String>,
    /// Total in minor currency units, as computed by Stripe
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    /// The hosted payment page. Only present while the session is open.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
}

//--------------------------------------   NewCheckoutSession  ---------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct NewLineItem {
    pub name: String,
    pub image_url: Option<String>,
    /// Unit price in minor currency units
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Parameters for `POST /v1/checkout/sessions` in `payment` mode.
#[derive(Debug, Clone, Default)]
pub struct NewCheckoutSession {
    pub success_url: String,
    pub cancel_url: String,
    pub currency: String,
    pub customer_email: Option<String>,
    pub line_items: Vec<NewLineItem>,
    pub metadata: BTreeMap<String, String>,
}

impl NewCheckoutSession {
    /// Flattens the request into Stripe's bracketed form-encoding, e.g. `line_items[0][quantity]=2`.
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];
        if let Some(email) = &self.customer_email {
            params.push(("customer_email".to_string(), email.clone()));
        }
        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((format!("{prefix}[price_data][currency]"), self.currency.clone()));
            params.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
            if let Some(url) = item.image_url.as_ref().filter(|u| !u.is_empty()) {
                params.push((format!("{prefix}[price_data][product_data][images][0]"), url.clone()));
            }
            params.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.to_string()));
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        for (key, value) in &self.metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }
        params
    }
}

//--------------------------------------      WebhookEvent     ---------------------------------------------------------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEventData {
    pub object: Value,
}

impl WebhookEvent {
    /// True for the event types that signal a checkout session whose payment may now be complete.
    pub fn is_checkout_completion(&self) -> bool {
        [CHECKOUT_SESSION_COMPLETED, CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED].contains(&self.event_type.as_str())
    }

    pub fn checkout_session(&self) -> Result<CheckoutSession, StripeApiError> {
        serde_json::from_value(self.data.object.clone()).map_err(|e| StripeApiError::JsonError(e.to_string()))
    }
}
