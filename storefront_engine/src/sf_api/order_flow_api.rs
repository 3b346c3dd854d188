use std::fmt::Debug;

use log::*;
use sf_common::helpers::non_empty;

use crate::{
    checkout_objects::{CheckoutRequest, CheckoutSession, MetadataError, OrderIntent},
    db_types::{OrderId, PaymentMethod, SessionId},
    helpers::{new_order_id, new_otp},
    order_objects::{validate_cart, OrderRequest, PlacedOrder, ReconcileOutcome},
    traits::{InsertOrderResult, OrderManagement, PaymentProviderError, PaymentSessionProvider, StoreError},
    OrderFlowError,
};

/// `OrderFlowApi` turns carts into orders.
///
/// Cash-on-delivery orders are written as soon as they are placed. Online orders are only written once the payment
/// provider reports the checkout session as paid, which can be learned in two ways:
/// * the provider pushes a signed webhook event ([`Self::reconcile_session`]), or
/// * the customer's browser returns from the hosted checkout page and asks us to confirm ([`Self::confirm_session`]).
///
/// Both paths run the same reconciliation and may run concurrently. The store's atomic insert-if-absent guarantees that
/// at most one order is ever created per session.
pub struct OrderFlowApi<B, P> {
    db: B,
    provider: P,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, P> OrderFlowApi<B, P> {
    pub fn new(db: B, provider: P) -> Self {
        Self { db, provider }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderManagement,
    P: PaymentSessionProvider,
{
    /// Accepts a new order from the checkout page.
    ///
    /// Cash orders are stored with status `preparing` and their new id is returned. Online orders open a hosted checkout
    /// session carrying the order details as metadata; the session id is returned and nothing is stored.
    pub async fn place_order(&self, request: OrderRequest) -> Result<PlacedOrder, OrderFlowError> {
        let (intent, method) = validate_order_request(request)?;
        match method {
            PaymentMethod::CashOnDelivery => {
                let order = intent.into_new_order(new_order_id(), PaymentMethod::CashOnDelivery, new_otp())?;
                let order_id = order.id.clone();
                let total = order.total_amount;
                match self.db.insert_order_if_absent(order).await? {
                    InsertOrderResult::Inserted(_) => {
                        info!("🛒️ Cash order {order_id} for {total} has been placed");
                    },
                    InsertOrderResult::AlreadyExists(_) => {
                        // 62^20 possible ids. If this ever fires, the RNG is broken.
                        error!("🛒️ Generated order id {order_id} collided with an existing order");
                        return Err(StoreError::InsertFailed(order_id).into());
                    },
                }
                Ok(PlacedOrder::Cash { order_id })
            },
            PaymentMethod::Online => {
                let metadata = intent.to_metadata().map_err(|e| match e {
                    MetadataError::TooLarge(s) | MetadataError::Corrupt(s) => OrderFlowError::ValidationError(s),
                })?;
                let request = CheckoutRequest {
                    line_items: intent.line_items(),
                    metadata,
                    customer_email: Some(intent.user_email.clone()),
                };
                let session = self.provider.create_checkout_session(request).await.map_err(|e| {
                    warn!("🛒️ Could not open a checkout session for {}. {e}", intent.user_id);
                    e
                })?;
                info!(
                    "🛒️ Checkout session {} opened for {} ({} cart lines)",
                    session.id,
                    intent.user_id,
                    intent.cart.len()
                );
                Ok(PlacedOrder::Online { session_id: session.id, url: session.url })
            },
        }
    }

    /// Pull trigger: the customer has returned from the hosted checkout page.
    ///
    /// The session is fetched from the provider exactly once. Provider failures are returned to the caller, who may
    /// poll again.
    pub async fn confirm_session(&self, session_id: &SessionId) -> Result<ReconcileOutcome, OrderFlowError> {
        debug!("🔄️ Confirming checkout session {session_id}");
        let session = self.provider.fetch_checkout_session(session_id).await?;
        if &session.id != session_id {
            warn!("🔄️ Asked the provider for session {session_id}, but got {}", session.id);
            return Err(PaymentProviderError::InvalidResponse("Session id mismatch".into()).into());
        }
        self.reconcile(session).await
    }

    /// Push trigger: a verified webhook event reported the session as complete. The session is taken at face value.
    pub async fn reconcile_session(&self, session: CheckoutSession) -> Result<ReconcileOutcome, OrderFlowError> {
        debug!("🔄️ Reconciling checkout session {} from webhook", session.id);
        self.reconcile(session).await
    }

    async fn reconcile(&self, session: CheckoutSession) -> Result<ReconcileOutcome, OrderFlowError> {
        if !session.payment_status.is_settled() {
            debug!("🔄️ Session {} is {:?}. No order will be created yet.", session.id, session.payment_status);
            return Err(OrderFlowError::PaymentIncompleteError(session.id));
        }
        let order_id = OrderId::from(session.id.clone());
        if let Some(order) = self.db.fetch_order_by_id(&order_id).await? {
            debug!("🔄️ Order {order_id} already exists. Nothing to do.");
            return Ok(ReconcileOutcome::AlreadyExists(order));
        }
        let intent = OrderIntent::from_metadata(&session.metadata).map_err(|e| {
            error!("🔄️ Session {} is paid, but its order details are unusable. {e}", session.id);
            OrderFlowError::MetadataCorruptError { session: session.id.clone(), reason: e.to_string() }
        })?;
        let order = intent.into_new_order(order_id.clone(), PaymentMethod::Online, new_otp())?;
        let total = order.total_amount;
        if let Some(reported) = session.amount_total {
            if reported != total {
                warn!(
                    "🔄️ Session {} was charged {reported}, but its cart adds up to {total}. The order records {total}.",
                    session.id
                );
            }
        }
        let outcome = match self.db.insert_order_if_absent(order).await? {
            InsertOrderResult::Inserted(order) => {
                info!("🔄️ Online order {order_id} for {total} has been created");
                ReconcileOutcome::Created(order)
            },
            InsertOrderResult::AlreadyExists(order) => {
                debug!("🔄️ Order {order_id} was created concurrently by the other trigger");
                ReconcileOutcome::AlreadyExists(order)
            },
        };
        Ok(outcome)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, OrderFlowError> {
    non_empty(value.as_deref())
        .map(String::from)
        .ok_or_else(|| OrderFlowError::ValidationError(format!("{field} is required")))
}

fn validate_order_request(request: OrderRequest) -> Result<(OrderIntent, PaymentMethod), OrderFlowError> {
    let cart = request.cart.unwrap_or_default();
    validate_cart(&cart).map_err(OrderFlowError::ValidationError)?;
    let intent = OrderIntent {
        user_id: required(request.user_id, "userId")?,
        user_email: required(request.user_email, "userEmail")?,
        user_name: required(request.user_name, "userName")?,
        address: required(request.address, "address")?,
        phone: required(request.phone, "phone")?,
        cart,
    };
    let method = required(request.payment_method, "paymentMethod")?
        .parse::<PaymentMethod>()
        .map_err(|e| OrderFlowError::InvalidRequestError(e.to_string()))?;
    Ok((intent, method))
}
