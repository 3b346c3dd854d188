use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{OrderStatusType, Role},
    AuthApi,
    OrdersApi,
};

use super::{helpers::*, mocks::MockStore};
use crate::routes::{AdminOrdersRoute, CheckRoleRoute, RegisterUserRoute, UpdateOrderStatusRoute, UpdateUserRoleRoute};

async fn check_role(store: MockStore, token: Option<String>) -> (StatusCode, String) {
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(AuthApi::new(store)))
            .service(CheckRoleRoute::<MockStore>::new()),
    )
    .await;
    let mut req = TestRequest::get().uri("/admin/check-role");
    if let Some(token) = token {
        req = req.insert_header(bearer(&token));
    }
    send(&app, req.to_request()).await
}

#[actix_web::test]
async fn admin_check() {
    let _ = env_logger::try_init();
    let (status, body) = check_role(user_store("uid_admin", Some(Role::Admin)), Some(issue_token("uid_admin"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"admin":true}"#);

    let (status, _) = check_role(user_store("uid_ada", Some(Role::User)), Some(issue_token("uid_ada"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = check_role(user_store("uid_ghost", None), Some(issue_token("uid_ghost"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bad_tokens_are_rejected() {
    let _ = env_logger::try_init();
    let no_store_calls = || {
        let mut store = MockStore::new();
        store.expect_fetch_user().times(0);
        store
    };
    let (status, body) = check_role(no_store_calls(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No identity token"), "{body}");

    let expired = issue_token_with_key(TEST_IDENTITY_SECRET, "uid_admin", Some(Utc::now() - Duration::hours(1)));
    let (status, _) = check_role(no_store_calls(), Some(expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let no_expiry = issue_token_with_key(TEST_IDENTITY_SECRET, "uid_admin", None);
    let (status, _) = check_role(no_store_calls(), Some(no_expiry)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = issue_token_with_key("some-other-key-entirely", "uid_admin", Some(Utc::now() + Duration::hours(1)));
    let (status, _) = check_role(no_store_calls(), Some(forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = check_role(no_store_calls(), Some("not.a.jwt".into())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn register_signed_in_user() {
    let mut store = MockStore::new();
    store
        .expect_insert_user_if_absent()
        .withf(|u| u.uid == "uid_ada" && u.email == "uid_ada@example.com" && u.display_name == "Ada")
        .times(1)
        .returning(|u| Ok(account(&u.uid, Role::User)));
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(AuthApi::new(store)))
            .service(RegisterUserRoute::<MockStore>::new()),
    )
    .await;
    let req = TestRequest::post().uri("/users").insert_header(bearer(&issue_token("uid_ada"))).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["role"], "user");
}

//----------------------------------------------   Admin routes  -------------------------------------------------------

async fn update_status(caller: &'static str, role: Role, orders: MockStore) -> (StatusCode, String) {
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(AuthApi::new(user_store(caller, Some(role)))))
            .app_data(web::Data::new(OrdersApi::new(orders)))
            .service(UpdateOrderStatusRoute::<MockStore>::new()),
    )
    .await;
    let req = TestRequest::patch()
        .uri("/admin/orders/order_1/status")
        .insert_header(bearer(&issue_token(caller)))
        .set_json(json!({"status": "delivered"}))
        .to_request();
    send(&app, req).await
}

#[actix_web::test]
async fn admin_updates_order_status() {
    let _ = env_logger::try_init();
    let mut orders = MockStore::new();
    orders.expect_fetch_order_by_id().returning(|id| Ok(Some(sample_order(id.as_str(), "uid_ada"))));
    orders
        .expect_update_order_status()
        .withf(|id, status| id.as_str() == "order_1" && *status == OrderStatusType::Delivered)
        .times(1)
        .returning(|id, status| {
            let mut order = sample_order(id.as_str(), "uid_ada");
            order.status = status;
            Ok(Some(order))
        });
    let (status, body) = update_status("uid_admin", Role::Admin, orders).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "delivered");
}

#[actix_web::test]
async fn customers_cannot_update_order_status() {
    let mut orders = MockStore::new();
    orders.expect_fetch_order_by_id().times(0);
    orders.expect_update_order_status().times(0);
    let (status, _) = update_status("uid_ada", Role::User, orders).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn status_update_for_unknown_order() {
    let mut orders = MockStore::new();
    orders.expect_fetch_order_by_id().returning(|_| Ok(None));
    orders.expect_update_order_status().times(0);
    let (status, _) = update_status("uid_admin", Role::Admin, orders).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_order_list() {
    let mut orders = MockStore::new();
    orders
        .expect_search_orders()
        .withf(|q| q.statuses == [OrderStatusType::Pending] && q.user_id.is_none())
        .times(1)
        .returning(|_| Ok(vec![sample_order("order_1", "uid_ada")]));
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(AuthApi::new(user_store("uid_admin", Some(Role::Admin)))))
            .app_data(web::Data::new(OrdersApi::new(orders)))
            .service(AdminOrdersRoute::<MockStore>::new()),
    )
    .await;
    let token = issue_token("uid_admin");
    let req = TestRequest::get().uri("/admin/orders?status=pending").insert_header(bearer(&token)).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let list: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let req = TestRequest::get().uri("/admin/orders?status=lost").insert_header(bearer(&token)).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_assigns_roles() {
    let mut store = user_store("uid_admin", Some(Role::Admin));
    store
        .expect_update_user_role()
        .withf(|uid, role| uid == "uid_bob" && *role == Role::Admin)
        .times(1)
        .returning(|uid, role| Ok(Some(account(uid, role))));
    let app = test::init_service(
        App::new()
            .app_data(token_verifier())
            .app_data(web::Data::new(AuthApi::new(store)))
            .service(UpdateUserRoleRoute::<MockStore>::new()),
    )
    .await;
    let req = TestRequest::patch()
        .uri("/admin/users/uid_bob/role")
        .insert_header(bearer(&issue_token("uid_admin")))
        .set_json(json!({"role": "admin"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let account: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(account["uid"], "uid_bob");
    assert_eq!(account["role"], "admin");
}
