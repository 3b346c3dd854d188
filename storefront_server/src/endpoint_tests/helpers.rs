use actix_http::Request;
use actix_web::{
    body::{self, MessageBody},
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    web,
};
use chrono::{DateTime, TimeZone, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
};
use storefront_engine::{
    checkout_objects::{CheckoutSession, OrderIntent, PaymentStatus},
    db_types::{CartLine, Money, NewOrder, Order, OrderId, PaymentMethod, Role, SessionId, UserAccount},
    order_objects::OrderRequest,
};

use super::mocks::MockStore;
use crate::{
    auth::{IdentityClaims, TokenVerifier},
    config::AuthConfig,
};

// DO NOT re-use this key anywhere.
pub const TEST_IDENTITY_SECRET: &str = "3b1f0c6a2f5e4d8c9a7b6e5d4c3b2a19f8e7d6c5";

pub fn token_verifier() -> web::Data<TokenVerifier> {
    web::Data::new(TokenVerifier::new(&AuthConfig::new(TEST_IDENTITY_SECRET)))
}

pub fn issue_token_with_key(key: &str, uid: &str, expiry: Option<DateTime<Utc>>) -> String {
    let key = Hs256Key::new(key.as_bytes());
    let header = Header::empty().with_token_type("JWT");
    let identity = IdentityClaims {
        uid: uid.to_string(),
        email: Some(format!("{uid}@example.com")),
        name: Some("Ada".to_string()),
        picture: None,
    };
    let mut claims = Claims::new(identity);
    claims.expiration = expiry;
    Hs256.token(&header, &claims, &key).expect("Failed to sign token")
}

pub fn issue_token(uid: &str) -> String {
    issue_token_with_key(TEST_IDENTITY_SECRET, uid, Some(Utc::now() + chrono::Duration::hours(1)))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Calls the service and returns the status and body, whether the response came from a handler or from a middleware
/// that bailed out early.
pub async fn send<S, B>(service: &S, req: Request) -> (StatusCode, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(service, req).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = body::to_bytes(res.into_body()).await.unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn sample_cart() -> Vec<CartLine> {
    vec![
        CartLine {
            product_id: "tee-red".into(),
            title: "Tee".into(),
            unit_price: Money::from_major(20),
            image_url: "https://img.example.com/tee.png".into(),
            color: "red".into(),
            quantity: 2,
        },
        CartLine {
            product_id: "socks-blue".into(),
            title: "Socks".into(),
            unit_price: Money::from_major(5),
            image_url: String::new(),
            color: "blue".into(),
            quantity: 1,
        },
    ]
}

pub fn sample_request(method: &str) -> OrderRequest {
    OrderRequest {
        cart: Some(sample_cart()),
        address: Some("12 Analytical Row, Pune".into()),
        phone: Some("555-0100".into()),
        payment_method: Some(method.into()),
        user_id: Some("uid_ada".into()),
        user_email: Some("ada@example.com".into()),
        user_name: Some("Ada".into()),
    }
}

pub fn sample_intent() -> OrderIntent {
    OrderIntent {
        user_id: "uid_ada".into(),
        user_email: "ada@example.com".into(),
        user_name: "Ada".into(),
        address: "12 Analytical Row, Pune".into(),
        phone: "555-0100".into(),
        cart: sample_cart(),
    }
}

pub fn paid_session(id: &str) -> CheckoutSession {
    CheckoutSession {
        id: SessionId::from(id),
        payment_status: PaymentStatus::Paid,
        amount_total: Some(Money::from_major(45)),
        metadata: sample_intent().to_metadata().expect("metadata"),
        url: None,
    }
}

pub fn stored(order: NewOrder) -> Order {
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Order {
        id: order.id,
        user_id: order.user_id,
        user_email: order.user_email,
        user_name: order.user_name,
        address: order.address,
        phone: order.phone,
        cart: order.cart,
        total_amount: order.total_amount,
        payment_method: order.payment_method,
        status: order.status,
        otp: order.otp,
        created_at: created,
        updated_at: created,
    }
}

pub fn sample_order(id: &str, user_id: &str) -> Order {
    let mut intent = sample_intent();
    intent.user_id = user_id.to_string();
    stored(intent.into_new_order(OrderId::from(id), PaymentMethod::CashOnDelivery, 123456).unwrap())
}

pub fn account(uid: &str, role: Role) -> UserAccount {
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    UserAccount {
        uid: uid.to_string(),
        email: format!("{uid}@example.com"),
        display_name: "Ada".into(),
        photo_url: None,
        role,
        created_at: created,
        updated_at: created,
    }
}

/// A store that knows about exactly one user.
pub fn user_store(uid: &'static str, role: Option<Role>) -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_user().returning(move |u| Ok(role.filter(|_| u == uid).map(|r| account(u, r))));
    store
}
