//! Webhook signature middleware.
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret and sends the result in the
//! `Stripe-Signature` header. The signature covers the raw request body, so this middleware reads the body, verifies
//! it, and puts it back for the handler. Requests that fail verification are rejected with a 400 before the handler
//! (and so the database) is ever reached.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorBadRequest,
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use sf_common::Secret;
use stripe_tools::{verify_webhook_signature, SIGNATURE_HEADER};

pub struct SignatureMiddlewareFactory {
    secret: Secret<String>,
    tolerance_secs: i64,
}

impl SignatureMiddlewareFactory {
    pub fn new(secret: Secret<String>, tolerance_secs: i64) -> Self {
        SignatureMiddlewareFactory { secret, tolerance_secs }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService {
            secret: self.secret.clone(),
            tolerance_secs: self.tolerance_secs,
            service: Rc::new(service),
        }))
    }
}

pub struct SignatureMiddlewareService<S> {
    secret: Secret<String>,
    tolerance_secs: i64,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.secret.reveal().clone();
        let tolerance = self.tolerance_secs;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature");
            if secret.is_empty() {
                warn!("🔐️ No webhook signing secret is configured. Rejecting webhook delivery.");
                return Err(ErrorBadRequest("Webhook signature could not be verified."));
            }
            let signature = req
                .headers()
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
                .ok_or_else(|| {
                    warn!("🔐️ No {SIGNATURE_HEADER} header found in webhook request. Denying access.");
                    ErrorBadRequest("Missing webhook signature.")
                })?;
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract webhook body: {e:?}");
                ErrorBadRequest("Failed to extract request data.")
            })?;
            match verify_webhook_signature(data.as_ref(), &signature, &secret, tolerance) {
                Ok(()) => {
                    trace!("🔐️ Webhook signature ✅️");
                    req.set_payload(bytes_to_payload(data));
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Invalid webhook signature. {e}");
                    Err(ErrorBadRequest(format!("Webhook signature verification failed. {e}")))
                },
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
