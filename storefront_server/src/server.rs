use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use storefront_engine::{AuthApi, OrderFlowApi, OrdersApi, SqliteDatabase};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    integrations::stripe::StripeSessionProvider,
    middleware::SignatureMiddlewareFactory,
    routes::{
        health,
        AdminOrdersRoute,
        CheckRoleRoute,
        ConfirmOrderRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PlaceOrderRoute,
        RegisterUserRoute,
        UpdateOrderStatusRoute,
        UpdateUserRoleRoute,
    },
    stripe_routes::StripeWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migration failed. {e}")))?;
    info!("🗃️ Database at {} is ready", db.url());
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let provider = StripeSessionProvider::new(&config.payments)
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Stripe client. {e}")))?;
    let verifier = web::Data::new(TokenVerifier::new(&config.auth));
    let payments = config.payments.clone();
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), provider.clone());
        let orders_api = OrdersApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let webhook_scope = web::scope("/webhook")
            .wrap(SignatureMiddlewareFactory::new(payments.webhook_secret.clone(), payments.webhook_tolerance))
            .service(StripeWebhookRoute::<SqliteDatabase, StripeSessionProvider>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sfs::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(auth_api))
            .app_data(verifier.clone())
            .service(health)
            .service(PlaceOrderRoute::<SqliteDatabase, StripeSessionProvider>::new())
            .service(ConfirmOrderRoute::<SqliteDatabase, StripeSessionProvider>::new())
            .service(RegisterUserRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(CheckRoleRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(AdminOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateUserRoleRoute::<SqliteDatabase>::new())
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
