//! Server configuration.
//!
//! Everything is read from `SFS_*` environment variables by [`ServerConfig::from_env_or_default`]. Missing or invalid
//! values fall back to defaults with a log message; nothing here stops the server from starting.
use std::env;

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sf_common::{helpers::non_empty, Secret};
use stripe_tools::StripeConfig;

use crate::errors::ServerError;

const DEFAULT_SFS_HOST: &str = "127.0.0.1";
const DEFAULT_SFS_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CURRENCY: &str = "inr";
const DEFAULT_WEBHOOK_TOLERANCE: i64 = 300;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    pub payments: PaymentConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFS_HOST.to_string(),
            port: DEFAULT_SFS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            payments: PaymentConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFS_HOST").ok().unwrap_or_else(|| DEFAULT_SFS_HOST.into());
        let port = env::var("SFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFS_PORT. {e} Using the default, {DEFAULT_SFS_PORT}, instead."
                    );
                    DEFAULT_SFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFS_PORT);
        let database_url = env::var("SFS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SFS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = env::var("SFS_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ Invalid configuration value for SFS_DB_MAX_CONNECTIONS: {s}");
                        None
                    })
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let payments = PaymentConfig::from_env_or_default();
        Self { host, port, database_url, db_max_connections, auth, payments }
    }
}

//-------------------------------------------------  PaymentConfig  ----------------------------------------------------
#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub stripe: StripeConfig,
    /// Signing secret of the webhook endpoint, used to verify `Stripe-Signature`.
    pub webhook_secret: Secret<String>,
    /// Maximum age of a webhook signature, in seconds. Zero disables the check.
    pub webhook_tolerance: i64,
    pub currency: String,
    /// The public storefront URL. Customers are sent back here after paying.
    pub base_url: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe: StripeConfig::default(),
            webhook_secret: Secret::default(),
            webhook_tolerance: DEFAULT_WEBHOOK_TOLERANCE,
            currency: DEFAULT_CURRENCY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl PaymentConfig {
    pub fn from_env_or_default() -> Self {
        let stripe = StripeConfig::new_from_env_or_default();
        let webhook_secret = env::var("SFS_STRIPE_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ SFS_STRIPE_WEBHOOK_SECRET is not set. Every webhook delivery will be rejected until it is set to \
                 the signing secret of the Stripe webhook endpoint."
            );
            String::default()
        });
        let webhook_tolerance = env::var("SFS_WEBHOOK_TOLERANCE")
            .map_err(|_| {
                info!("🪛️ SFS_WEBHOOK_TOLERANCE is not set. Using the default value of {DEFAULT_WEBHOOK_TOLERANCE}s.")
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SFS_WEBHOOK_TOLERANCE. {e}"))
                    .and_then(|v| {
                        if v < 0 {
                            warn!("🪛️ SFS_WEBHOOK_TOLERANCE cannot be negative");
                            Err(())
                        } else {
                            Ok(v)
                        }
                    })
            })
            .ok()
            .unwrap_or(DEFAULT_WEBHOOK_TOLERANCE);
        if webhook_tolerance == 0 {
            warn!("🚨️ Webhook replay protection is disabled (SFS_WEBHOOK_TOLERANCE=0).");
        }
        let currency = non_empty(env::var("SFS_STRIPE_CURRENCY").ok().as_deref())
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let base_url = env::var("SFS_BASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SFS_BASE_URL is not set. Checkout redirects will point at {DEFAULT_BASE_URL}.");
            DEFAULT_BASE_URL.to_string()
        });
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { stripe, webhook_secret: Secret::new(webhook_secret), webhook_tolerance, currency, base_url }
    }

    /// Stripe substitutes `{CHECKOUT_SESSION_ID}` when it redirects the customer.
    pub fn success_url(&self) -> String {
        format!("{}/order-confirmation?session_id={{CHECKOUT_SESSION_ID}}", self.base_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/payment-failed", self.base_url)
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Shared HS256 key that identity tokens are signed with.
    pub identity_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The identity token secret has not been set. I'm using a random value for this session, so no \
             identity token will be accepted. Set SFS_IDENTITY_JWT_SECRET. 🚨️🚨️🚨️"
        );
        let key = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { identity_secret: Secret::new(key) }
    }
}

impl AuthConfig {
    pub fn new(identity_secret: &str) -> Self {
        Self { identity_secret: Secret::new(identity_secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("SFS_IDENTITY_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [SFS_IDENTITY_JWT_SECRET]")))?;
        if secret.trim().len() < 32 {
            return Err(ServerError::ConfigurationError(
                "SFS_IDENTITY_JWT_SECRET must be at least 32 characters long".into(),
            ));
        }
        Ok(Self::new(secret.trim()))
    }
}
