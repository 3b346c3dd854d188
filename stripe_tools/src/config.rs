use log::*;
use sf_common::Secret;

const DEFAULT_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    /// Base URL of the API. Override this to point at `stripe-mock` or a test double.
    pub api_url: String,
    /// Optional `Stripe-Version` header. If empty, the account default version is used.
    pub api_version: String,
    pub secret_key: Secret<String>,
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SFS_STRIPE_API_URL").unwrap_or_else(|_| {
            debug!("💳️ SFS_STRIPE_API_URL not set, using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        let api_version = std::env::var("SFS_STRIPE_API_VERSION").unwrap_or_default();
        let secret_key = Secret::new(std::env::var("SFS_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("💳️ SFS_STRIPE_SECRET_KEY not set, using (probably useless) default");
            "sk_test_00000000000000".to_string()
        }));
        Self { api_url, api_version, secret_key }
    }
}
