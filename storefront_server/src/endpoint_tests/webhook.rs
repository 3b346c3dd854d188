use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use serde_json::{json, Value};
use sf_common::Secret;
use storefront_engine::{
    db_types::PaymentMethod,
    traits::{InsertOrderResult, StoreError},
    OrderFlowApi,
};
use stripe_tools::{compute_signature, SIGNATURE_HEADER};

use super::{
    helpers::*,
    mocks::{MockProvider, MockStore},
};
use crate::{middleware::SignatureMiddlewareFactory, stripe_routes::StripeWebhookRoute};

const WEBHOOK_SECRET: &str = "whsec_test_secret";

fn event(event_type: &str, payment_status: &str) -> String {
    let metadata = sample_intent().to_metadata().unwrap();
    json!({
        "id": "evt_1",
        "type": event_type,
        "created": 1717243200,
        "livemode": false,
        "data": {
            "object": {
                "id": "cs_test_1",
                "object": "checkout.session",
                "payment_status": payment_status,
                "status": "complete",
                "amount_total": 4500,
                "currency": "inr",
                "metadata": metadata
            }
        }
    })
    .to_string()
}

fn signature_for(payload: &str, secret: &str, timestamp: i64) -> String {
    let sig = compute_signature(payload.as_bytes(), secret, timestamp).unwrap();
    format!("t={timestamp},v1={sig}")
}

async fn deliver(store: MockStore, payload: String, signature: Option<String>) -> (StatusCode, String) {
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().times(0);
    let app = test::init_service(
        App::new().app_data(web::Data::new(OrderFlowApi::new(store, provider))).service(
            web::scope("/webhook")
                .wrap(SignatureMiddlewareFactory::new(Secret::new(WEBHOOK_SECRET.to_string()), 300))
                .service(StripeWebhookRoute::<MockStore, MockProvider>::new()),
        ),
    )
    .await;
    let mut req = TestRequest::post().uri("/webhook").insert_header(("Content-Type", "application/json"));
    if let Some(signature) = signature {
        req = req.insert_header((SIGNATURE_HEADER, signature));
    }
    send(&app, req.set_payload(payload).to_request()).await
}

fn untouched_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().times(0);
    store.expect_insert_order_if_absent().times(0);
    store
}

#[actix_web::test]
async fn paid_session_creates_order() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().times(1).returning(|_| Ok(None));
    store
        .expect_insert_order_if_absent()
        .withf(|o| o.id.as_str() == "cs_test_1" && o.payment_method == PaymentMethod::Online)
        .times(1)
        .returning(|o| Ok(InsertOrderResult::Inserted(stored(o))));
    let payload = event("checkout.session.completed", "paid");
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, body) = deliver(store, payload, Some(signature)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn async_payment_for_existing_order() {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id.as_str(), "uid_ada"))));
    store.expect_insert_order_if_absent().times(0);
    let payload = event("checkout.session.async_payment_succeeded", "paid");
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, _) = deliver(store, payload, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn invalid_signatures_never_reach_the_store() {
    let _ = env_logger::try_init();
    let payload = event("checkout.session.completed", "paid");
    let now = Utc::now().timestamp();

    let (status, _) = deliver(untouched_store(), payload.clone(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let wrong_secret = signature_for(&payload, "whsec_someone_else", now);
    let (status, _) = deliver(untouched_store(), payload.clone(), Some(wrong_secret)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let signature = signature_for(&payload, WEBHOOK_SECRET, now);
    let tampered = payload.replace("4500", "1");
    let (status, _) = deliver(untouched_store(), tampered, Some(signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stale = signature_for(&payload, WEBHOOK_SECRET, now - 3600);
    let (status, _) = deliver(untouched_store(), payload.clone(), Some(stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = deliver(untouched_store(), payload, Some("garbage".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unrelated_events_are_acknowledged() {
    let payload = event("customer.created", "paid");
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, _) = deliver(untouched_store(), payload, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn unpaid_sessions_are_acknowledged() {
    let payload = event("checkout.session.completed", "unpaid");
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, _) = deliver(untouched_store(), payload, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn store_failures_ask_for_redelivery() {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    store
        .expect_insert_order_if_absent()
        .returning(|_| Err(StoreError::DatabaseError("database is locked".into())));
    let payload = event("checkout.session.completed", "paid");
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, _) = deliver(store, payload, Some(signature)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn malformed_events() {
    let payload = r#"{"id": "evt_1"}"#.to_string();
    let signature = signature_for(&payload, WEBHOOK_SECRET, Utc::now().timestamp());
    let (status, _) = deliver(untouched_store(), payload, Some(signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
