//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module (see [`crate::stripe_routes`]). Keep this
//! module neat and tidy 🙏
//!
//! Every handler is async. Store and payment provider calls are awaited, so a slow Stripe response never blocks the
//! worker thread from serving other requests.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{NewUser, OrderId, Role, SessionId},
    order_objects::{OrderQueryFilter, OrderRequest},
    traits::{OrderManagement, PaymentSessionProvider, UserManagement},
    AuthApi,
    AuthApiError,
    OrderFlowApi,
    OrdersApi,
};

use crate::{
    auth::IdentityClaims,
    data_objects::{AdminOrdersQuery, ConfirmOrderQuery, ConfirmedOrder, RoleCheck, RoleUpdateRequest, StatusUpdateRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),+])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::<A>::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(place_order => Post "/orders-intake" impl OrderManagement, PaymentSessionProvider);
/// Accepts an order from the checkout page.
///
/// Cash on delivery orders are stored right away and `{"orderId": ...}` is returned. Online orders return
/// `{"sessionId": ..., "url": ...}` and the customer is sent to the hosted payment page. Any total sent by the client
/// is ignored.
pub async fn place_order<B, P>(
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    P: PaymentSessionProvider,
{
    trace!("💻️ Received new order");
    let placed = api.place_order(body.into_inner()).await.map_err(|e| {
        debug!("💻️ Order was not placed. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(placed))
}

route!(confirm_order => Get "/confirm-order" impl OrderManagement, PaymentSessionProvider);
/// Called by the order confirmation page once the customer is back from the payment page. Safe to call repeatedly,
/// and safe to race against the webhook.
pub async fn confirm_order<B, P>(
    query: web::Query<ConfirmOrderQuery>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    P: PaymentSessionProvider,
{
    let session_id = query
        .into_inner()
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::ValidationError("session_id is required".into()))?;
    trace!("💻️ Confirming order for session {session_id}");
    let outcome = api.confirm_session(&SessionId::from(session_id)).await?;
    Ok(HttpResponse::Ok().json(ConfirmedOrder { order_id: outcome.order_id().clone() }))
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(register_user => Post "/users" impl UserManagement);
/// Records the signed-in user. New users get the `user` role; existing accounts are returned as they are.
pub async fn register_user<A: UserManagement>(
    claims: IdentityClaims,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = NewUser {
        uid: claims.uid,
        email: claims.email.unwrap_or_default(),
        display_name: claims.name.unwrap_or_default(),
        photo_url: claims.picture,
    };
    let account = api.register_user(user).await?;
    Ok(HttpResponse::Ok().json(account))
}

route!(my_orders => Get "/orders" impl OrderManagement);
pub async fn my_orders<B: OrderManagement>(
    claims: IdentityClaims,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", claims.uid);
    let orders = api.orders_for_user(&claims.uid).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/order/{order_id}" impl OrderManagement, UserManagement);
/// Fetches a single order, including its delivery OTP. Only the customer who placed the order and admins can see it;
/// everyone else gets a 404.
pub async fn order_by_id<B, A>(
    claims: IdentityClaims,
    path: web::Path<String>,
    orders: web::Data<OrdersApi<B>>,
    auth: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    A: UserManagement,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {order_id} for {}", claims.uid);
    let not_found = || ServerError::NoRecordFound(format!("Order {order_id} not found."));
    let order = orders.fetch_order(&order_id).await?.ok_or_else(not_found)?;
    if order.user_id != claims.uid {
        match auth.check_role(&claims.uid, Role::Admin).await {
            Ok(()) => {},
            Err(AuthApiError::RoleNotAllowed(_)) | Err(AuthApiError::UserNotFound(_)) => {
                info!("💻️ {} asked for order {order_id}, which belongs to someone else", claims.uid);
                return Err(not_found());
            },
            Err(e) => return Err(e.into()),
        }
    }
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(check_role => Get "/admin/check-role" impl UserManagement);
/// Lets the admin dashboard find out whether the signed-in user is an admin.
pub async fn check_role<A: UserManagement>(
    claims: IdentityClaims,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    api.check_role(&claims.uid, Role::Admin).await?;
    Ok(HttpResponse::Ok().json(RoleCheck { admin: true }))
}

route!(update_order_status => Patch "/admin/orders/{order_id}/status" impl OrderManagement, UserManagement where requires [Role::Admin]);
pub async fn update_order_status<A: OrderManagement>(
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrdersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let status = body.into_inner().status;
    debug!("💻️ PATCH status of order {order_id} to {status}");
    let order = api.update_order_status(&order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(admin_orders => Get "/admin/orders" impl OrderManagement, UserManagement where requires [Role::Admin]);
pub async fn admin_orders<A: OrderManagement>(
    query: web::Query<AdminOrdersQuery>,
    api: web::Data<OrdersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let filter = OrderQueryFilter::try_from(query.into_inner()).map_err(ServerError::ValidationError)?;
    debug!("💻️ GET admin order list with {filter:?}");
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_user_role => Patch "/admin/users/{uid}/role" impl UserManagement where requires [Role::Admin]);
pub async fn update_user_role<A: UserManagement>(
    path: web::Path<String>,
    body: web::Json<RoleUpdateRequest>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let uid = path.into_inner();
    let role = body.into_inner().role;
    debug!("💻️ PATCH role of {uid} to {role}");
    let account = api.assign_role(&uid, role).await?;
    Ok(HttpResponse::Ok().json(account))
}
