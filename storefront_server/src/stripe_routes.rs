//! Stripe webhook handling.
//!
//! The route is wrapped in the signature middleware by the server, so by the time a request reaches
//! [`stripe_webhook`] its body is known to come from Stripe.
//!
//! Stripe redelivers any event that does not get a 2xx response. We answer 200 for everything that would fail the same
//! way again (unknown event types, unpaid sessions, unusable metadata) and 500 only when the store let us down, so
//! that a redelivery can succeed.
use actix_web::{web, HttpResponse};
use log::*;
use storefront_engine::{
    order_objects::ReconcileOutcome,
    traits::{OrderManagement, PaymentSessionProvider},
    OrderFlowApi,
    OrderFlowError,
};
use stripe_tools::WebhookEvent;

use crate::{data_objects::JsonResponse, integrations::stripe::checkout_session_from_stripe, route};

route!(stripe_webhook => Post "" impl OrderManagement, PaymentSessionProvider);
pub async fn stripe_webhook<B, P>(body: web::Bytes, api: web::Data<OrderFlowApi<B, P>>) -> HttpResponse
where
    B: OrderManagement,
    P: PaymentSessionProvider,
{
    let event = match serde_json::from_slice::<WebhookEvent>(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("💳️ Could not read webhook event. {e}");
            return HttpResponse::BadRequest().json(JsonResponse::failure("Malformed event"));
        },
    };
    trace!("💳️ Received webhook event {} ({})", event.id, event.event_type);
    if !event.is_checkout_completion() {
        debug!("💳️ Ignoring {} event {}", event.event_type, event.id);
        return HttpResponse::Ok().json(JsonResponse::success("Event ignored."));
    }
    let session = match event.checkout_session().map_err(|e| e.to_string()).and_then(|s| {
        checkout_session_from_stripe(s).map_err(|e| e.to_string())
    }) {
        Ok(session) => session,
        Err(e) => {
            warn!("💳️ Event {} does not carry a usable checkout session. {e}", event.id);
            return HttpResponse::BadRequest().json(JsonResponse::failure("Malformed checkout session"));
        },
    };
    let session_id = session.id.clone();
    match api.reconcile_session(session).await {
        Ok(ReconcileOutcome::Created(order)) => {
            info!("💳️ Order {} created from webhook event {}", order.id, event.id);
            HttpResponse::Ok().json(JsonResponse::success("Order created."))
        },
        Ok(ReconcileOutcome::AlreadyExists(order)) => {
            info!("💳️ Order {} already exists. Webhook event {} needs no action.", order.id, event.id);
            HttpResponse::Ok().json(JsonResponse::success("Order already exists."))
        },
        Err(OrderFlowError::PaymentIncompleteError(_)) => {
            info!("💳️ Session {session_id} has not been paid yet. Waiting for a later event.");
            HttpResponse::Ok().json(JsonResponse::success("Payment not complete."))
        },
        Err(OrderFlowError::MetadataCorruptError { reason, .. }) => {
            error!("💳️ Session {session_id} was paid, but no order can be created from it. {reason}");
            HttpResponse::Ok().json(JsonResponse::failure("Order details unavailable."))
        },
        Err(e) => {
            error!("💳️ Could not create the order for session {session_id}. Stripe will redeliver. {e}");
            HttpResponse::InternalServerError().json(JsonResponse::failure("Could not process event."))
        },
    }
}
