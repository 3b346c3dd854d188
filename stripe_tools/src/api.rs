use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{config::StripeConfig, CheckoutSession, NewCheckoutSession, StripeApiError};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let auth = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&auth).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        if !config.api_version.is_empty() {
            let version = HeaderValue::from_str(&config.api_version)
                .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
            headers.insert("Stripe-Version", version);
        }
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a request to the Stripe REST API. Request bodies are form-encoded, as Stripe requires.
    ///
    /// Transport failures map to [`StripeApiError::RequestError`]; non-2xx responses map to
    /// [`StripeApiError::QueryError`] carrying Stripe's own error message where one is given.
    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(String, String)]>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(form) = form {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let body = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status: status.as_u16(), message: extract_error_message(&body) })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CheckoutSession, StripeApiError> {
        debug!("💳️ Creating checkout session with {} line items", session.line_items.len());
        let params = session.form_params();
        let result = self.rest_query::<CheckoutSession>(Method::POST, "/checkout/sessions", Some(&params)).await?;
        info!("💳️ Created checkout session {}", result.id);
        Ok(result)
    }

    pub async fn fetch_checkout_session(&self, session_id: &str) -> Result<CheckoutSession, StripeApiError> {
        debug!("💳️ Fetching checkout session {session_id}");
        let path = format!("/checkout/sessions/{session_id}");
        let result = self.rest_query::<CheckoutSession>(Method::GET, &path, None).await?;
        debug!("💳️ Checkout session {session_id} has payment status '{}'", result.payment_status);
        Ok(result)
    }
}

/// Stripe errors look like `{"error": {"message": "...", "type": "invalid_request_error"}}`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
