use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{cart_total, CartLine, Money, Order, OrderId, OrderStatusType, PaymentMethod, SessionId};

//--------------------------------------     OrderRequest      ---------------------------------------------------------
/// An order as submitted by the storefront checkout page.
///
/// Every field is optional so that a missing field is reported as a validation failure with a useful message, rather
/// than as a JSON decoding error. Any client-supplied total is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub cart: Option<Vec<CartLine>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

/// Checks that a cart can be turned into an order. The error message names the first offending line.
pub fn validate_cart(cart: &[CartLine]) -> Result<(), String> {
    if cart.is_empty() {
        return Err("The cart is empty".to_string());
    }
    for (i, line) in cart.iter().enumerate() {
        if line.product_id.trim().is_empty() {
            return Err(format!("Cart line {i} has no product id"));
        }
        if line.title.trim().is_empty() {
            return Err(format!("Cart line {i} has no title"));
        }
        if line.quantity <= 0 {
            return Err(format!("Cart line {i} has a non-positive quantity"));
        }
        if line.unit_price < Money::default() {
            return Err(format!("Cart line {i} has a negative price"));
        }
        if line.line_total().is_none() {
            return Err(format!("Cart line {i} has a total that is too large"));
        }
    }
    cart_total(cart).map(|_| ()).ok_or_else(|| "The cart total is too large".to_string())
}

//--------------------------------------      PlacedOrder      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlacedOrder {
    /// A cash-on-delivery order was written immediately.
    Cash {
        #[serde(rename = "orderId")]
        order_id: OrderId,
    },
    /// A checkout session was opened. No order exists until the payment completes.
    Online {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

//--------------------------------------    ReconcileOutcome   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Created(Order),
    /// The other trigger got there first.
    AlreadyExists(Order),
}

impl ReconcileOutcome {
    pub fn order(&self) -> &Order {
        match self {
            ReconcileOutcome::Created(o) | ReconcileOutcome::AlreadyExists(o) => o,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order().id
    }
}

//--------------------------------------    OrderQueryFilter   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub user_id: Option<String>,
    pub statuses: Vec<OrderStatusType>,
    pub payment_method: Option<PaymentMethod>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() &&
            self.statuses.is_empty() &&
            self.payment_method.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}
