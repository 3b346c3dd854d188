use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use serde_json::{json, Value};
use storefront_engine::{
    checkout_objects::{CheckoutSession, PaymentStatus},
    db_types::{Money, OrderStatusType, PaymentMethod, Role, SessionId},
    traits::{InsertOrderResult, PaymentProviderError},
    OrderFlowApi,
    OrdersApi,
};

use super::{
    helpers::*,
    mocks::{MockProvider, MockStore},
};
use crate::routes::{health, ConfirmOrderRoute, MyOrdersRoute, OrderByIdRoute, PlaceOrderRoute};

fn order_flow_app(
    store: MockStore,
    provider: MockProvider,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(OrderFlowApi::new(store, provider)))
        .service(PlaceOrderRoute::<MockStore, MockProvider>::new())
        .service(ConfirmOrderRoute::<MockStore, MockProvider>::new())
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let (status, body) = send(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn cash_order_intake() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store
        .expect_insert_order_if_absent()
        .withf(|o| {
            o.total_amount == Money::from_major(45) &&
                o.status == OrderStatusType::Preparing &&
                o.payment_method == PaymentMethod::CashOnDelivery &&
                (100_000..=999_999).contains(&o.otp)
        })
        .times(1)
        .returning(|o| Ok(InsertOrderResult::Inserted(stored(o))));
    let mut provider = MockProvider::new();
    provider.expect_create_checkout_session().times(0);
    let app = test::init_service(order_flow_app(store, provider)).await;

    let mut request = serde_json::to_value(sample_request("COD")).unwrap();
    request["totalAmount"] = json!(1);
    let req = TestRequest::post().uri("/orders-intake").set_json(request).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["orderId"].as_str().unwrap().len(), 20);
}

#[actix_web::test]
async fn invalid_orders_are_rejected() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_insert_order_if_absent().times(0);
    let mut provider = MockProvider::new();
    provider.expect_create_checkout_session().times(0);
    let app = test::init_service(order_flow_app(store, provider)).await;

    let mut request = sample_request("COD");
    request.address = None;
    let req = TestRequest::post().uri("/orders-intake").set_json(request).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("address is required"), "{body}");

    let mut request = sample_request("COD");
    request.cart.as_mut().unwrap()[0].quantity = i64::MAX;
    let req = TestRequest::post().uri("/orders-intake").set_json(request).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("too large"), "{body}");

    let req = TestRequest::post().uri("/orders-intake").set_json(sample_request("BARTER")).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error"), "{body}");

    let req = TestRequest::post()
        .uri("/orders-intake")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn online_order_intake() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_insert_order_if_absent().times(0);
    let mut provider = MockProvider::new();
    provider
        .expect_create_checkout_session()
        .withf(|r| r.line_items.len() == 2 && r.customer_email.as_deref() == Some("ada@example.com"))
        .times(1)
        .returning(|r| {
            Ok(CheckoutSession {
                id: SessionId::from("cs_test_1"),
                payment_status: PaymentStatus::Unpaid,
                amount_total: Some(Money::from_major(45)),
                metadata: r.metadata,
                url: Some("https://checkout.stripe.com/c/pay/cs_test_1".into()),
            })
        });
    let app = test::init_service(order_flow_app(store, provider)).await;

    let req = TestRequest::post().uri("/orders-intake").set_json(sample_request("ONLINE")).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test_1");
    assert!(body.get("orderId").is_none());
}

#[actix_web::test]
async fn online_intake_provider_down() {
    let _ = env_logger::try_init();
    let mut provider = MockProvider::new();
    provider
        .expect_create_checkout_session()
        .returning(|_| Err(PaymentProviderError::Unreachable("connection refused".into())));
    let app = test::init_service(order_flow_app(MockStore::new(), provider)).await;
    let req = TestRequest::post().uri("/orders-intake").set_json(sample_request("ONLINE")).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("connection refused"), "{body}");
}

#[actix_web::test]
async fn confirm_order_requires_a_session_id() {
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().times(0);
    let app = test::init_service(order_flow_app(MockStore::new(), provider)).await;
    for uri in ["/confirm-order", "/confirm-order?session_id=", "/confirm-order?session_id=%20"] {
        let (status, body) = send(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.contains("session_id is required"), "{body}");
    }
}

#[actix_web::test]
async fn confirm_unpaid_order() {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().times(0);
    store.expect_insert_order_if_absent().times(0);
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().times(1).returning(|id| {
        let mut session = paid_session(id.as_str());
        session.payment_status = PaymentStatus::Unpaid;
        Ok(session)
    });
    let app = test::init_service(order_flow_app(store, provider)).await;
    let req = TestRequest::get().uri("/confirm-order?session_id=cs_test_1").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn confirm_paid_order() {
    let _ = env_logger::try_init();
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().times(1).returning(|_| Ok(None));
    store
        .expect_insert_order_if_absent()
        .withf(|o| o.id.as_str() == "cs_test_1" && o.payment_method == PaymentMethod::Online)
        .times(1)
        .returning(|o| Ok(InsertOrderResult::Inserted(stored(o))));
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().times(1).returning(|id| Ok(paid_session(id.as_str())));
    let app = test::init_service(order_flow_app(store, provider)).await;

    let req = TestRequest::get().uri("/confirm-order?session_id=cs_test_1").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"orderId":"cs_test_1"}"#);
}

#[actix_web::test]
async fn confirm_already_created_order() {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().times(1).returning(|id| Ok(Some(sample_order(id.as_str(), "uid_ada"))));
    store.expect_insert_order_if_absent().times(0);
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().returning(|id| Ok(paid_session(id.as_str())));
    let app = test::init_service(order_flow_app(store, provider)).await;

    let req = TestRequest::get().uri("/confirm-order?session_id=cs_test_1").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"orderId":"cs_test_1"}"#);
}

#[actix_web::test]
async fn confirm_order_with_corrupt_metadata() {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    store.expect_insert_order_if_absent().times(0);
    let mut provider = MockProvider::new();
    provider.expect_fetch_checkout_session().returning(|id| {
        let mut session = paid_session(id.as_str());
        session.metadata.remove("cart");
        Ok(session)
    });
    let app = test::init_service(order_flow_app(store, provider)).await;
    let req = TestRequest::get().uri("/confirm-order?session_id=cs_test_1").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"Order details unavailable."}"#);
}

//----------------------------------------------   Customer routes  ----------------------------------------------------

#[actix_web::test]
async fn my_orders_requires_a_token() {
    let mut store = MockStore::new();
    store.expect_search_orders().times(0);
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(OrdersApi::new(store)))
            .service(MyOrdersRoute::<MockStore>::new()),
    )
    .await;
    let (status, _) = send(&app, TestRequest::get().uri("/orders").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let mut store = MockStore::new();
    store
        .expect_search_orders()
        .withf(|q| q.user_id.as_deref() == Some("uid_ada") && q.statuses.is_empty())
        .returning(|_| Ok(vec![sample_order("order_2", "uid_ada"), sample_order("order_1", "uid_ada")]));
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(OrdersApi::new(store)))
            .service(MyOrdersRoute::<MockStore>::new()),
    )
    .await;
    let req = TestRequest::get().uri("/orders").insert_header(bearer(&issue_token("uid_ada"))).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders[0]["id"], "order_2");
    assert_eq!(orders[1]["totalAmount"], 45.0);
    assert_eq!(orders[1]["paymentMethod"], "CASH_ON_DELIVERY");

    // The session cookie works too
    let cookie = actix_web::cookie::Cookie::new("__session", issue_token("uid_ada"));
    let req = TestRequest::get().uri("/orders").cookie(cookie).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

async fn fetch_order_as(uid: &'static str, role: Role) -> (StatusCode, String) {
    let mut orders = MockStore::new();
    orders.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id.as_str(), "uid_owner"))));
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(OrdersApi::new(orders)))
            .app_data(web::Data::new(storefront_engine::AuthApi::new(user_store(uid, Some(role)))))
            .service(OrderByIdRoute::<MockStore, MockStore>::new()),
    )
    .await;
    let req = TestRequest::get().uri("/order/order_1").insert_header(bearer(&issue_token(uid))).to_request();
    send(&app, req).await
}

#[actix_web::test]
async fn orders_are_private() {
    let (status, body) = fetch_order_as("uid_owner", Role::User).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["otp"], 123456);

    let (status, body) = fetch_order_as("uid_admin", Role::Admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = fetch_order_as("uid_snoop", Role::User).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.contains("123456"));
}
