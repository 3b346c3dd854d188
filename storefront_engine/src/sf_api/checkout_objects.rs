//! Types exchanged with a hosted-checkout payment provider, and the [`OrderIntent`] that rides along with a checkout
//! session as metadata until the payment completes.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db_types::{cart_total, CartLine, Money, NewOrder, OrderId, OrderStatusType, PaymentMethod, SessionId},
    order_objects::validate_cart,
    OrderFlowError,
};

/// Hosted-checkout providers cap metadata values at this many characters.
pub const METADATA_VALUE_LIMIT: usize = 500;
/// Hosted-checkout providers cap the number of metadata keys per session.
pub const METADATA_KEY_LIMIT: usize = 50;

pub const KEY_USER_ID: &str = "userId";
pub const KEY_USER_EMAIL: &str = "userEmail";
pub const KEY_USER_NAME: &str = "userName";
pub const KEY_ADDRESS: &str = "address";
pub const KEY_PHONE: &str = "phone";
pub const KEY_CART: &str = "cart";
pub const KEY_CART_CHUNKS: &str = "cart_chunks";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("The order is too large to attach to a checkout session. {0}")]
    TooLarge(String),
    #[error("Checkout metadata is corrupt. {0}")]
    Corrupt(String),
}

//--------------------------------------    CheckoutRequest    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLineItem {
    pub name: String,
    pub image_url: Option<String>,
    pub unit_amount: Money,
    pub quantity: i64,
}

impl From<&CartLine> for CheckoutLineItem {
    fn from(line: &CartLine) -> Self {
        let image_url = Some(line.image_url.clone()).filter(|u| !u.trim().is_empty());
        Self { name: line.title.clone(), image_url, unit_amount: line.unit_price, quantity: line.quantity }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// One line item per cart line, in cart order
    pub line_items: Vec<CheckoutLineItem>,
    pub metadata: BTreeMap<String, String>,
    pub customer_email: Option<String>,
}

//--------------------------------------    CheckoutSession    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl PaymentStatus {
    /// True when the session needs no further payment and an order may be created from it.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: SessionId,
    pub payment_status: PaymentStatus,
    /// The total the provider computed, in minor units. Informational only.
    pub amount_total: Option<Money>,
    pub metadata: BTreeMap<String, String>,
    /// Where to send the customer to pay. Only present on freshly created sessions.
    pub url: Option<String>,
}

//--------------------------------------      OrderIntent      ---------------------------------------------------------
/// Everything needed to create an order once payment completes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub address: String,
    pub phone: String,
    pub cart: Vec<CartLine>,
}

impl OrderIntent {
    pub fn line_items(&self) -> Vec<CheckoutLineItem> {
        self.cart.iter().map(CheckoutLineItem::from).collect()
    }

    /// `None` if the cart total overflows.
    pub fn total(&self) -> Option<Money> {
        cart_total(&self.cart)
    }

    /// Serializes the intent into string metadata.
    ///
    /// The cart is written as compact JSON under `cart`. If that exceeds [`METADATA_VALUE_LIMIT`] characters it is
    /// split into `cart_0 .. cart_{n-1}` and `cart_chunks = n` is recorded.
    pub fn to_metadata(&self) -> Result<BTreeMap<String, String>, MetadataError> {
        let mut metadata = BTreeMap::new();
        for (key, value) in [
            (KEY_USER_ID, &self.user_id),
            (KEY_USER_EMAIL, &self.user_email),
            (KEY_USER_NAME, &self.user_name),
            (KEY_ADDRESS, &self.address),
            (KEY_PHONE, &self.phone),
        ] {
            if value.chars().count() > METADATA_VALUE_LIMIT {
                return Err(MetadataError::TooLarge(format!("{key} exceeds {METADATA_VALUE_LIMIT} characters")));
            }
            metadata.insert(key.to_string(), value.clone());
        }
        let cart = serde_json::to_string(&self.cart).map_err(|e| MetadataError::TooLarge(e.to_string()))?;
        let chars = cart.chars().collect::<Vec<char>>();
        if chars.len() <= METADATA_VALUE_LIMIT {
            metadata.insert(KEY_CART.to_string(), cart);
            return Ok(metadata);
        }
        let chunks = chars.chunks(METADATA_VALUE_LIMIT).map(|c| c.iter().collect::<String>()).collect::<Vec<_>>();
        // +1 for the chunk count itself
        if metadata.len() + chunks.len() + 1 > METADATA_KEY_LIMIT {
            return Err(MetadataError::TooLarge(format!(
                "The cart needs {} metadata entries but at most {METADATA_KEY_LIMIT} keys are allowed",
                chunks.len()
            )));
        }
        metadata.insert(KEY_CART_CHUNKS.to_string(), chunks.len().to_string());
        for (i, chunk) in chunks.into_iter().enumerate() {
            metadata.insert(format!("{KEY_CART}_{i}"), chunk);
        }
        Ok(metadata)
    }

    /// Rebuilds an intent from session metadata. Any missing field, missing chunk or invalid cart is an error; no
    /// partial intent is ever returned.
    pub fn from_metadata(metadata: &BTreeMap<String, String>) -> Result<Self, MetadataError> {
        let field = |key: &str| -> Result<String, MetadataError> {
            metadata
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or_else(|| MetadataError::Corrupt(format!("{key} is missing")))
        };
        let cart_json = match metadata.get(KEY_CART_CHUNKS) {
            Some(n) => {
                let n = n
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| MetadataError::Corrupt(format!("Invalid {KEY_CART_CHUNKS}. {e}")))?;
                (0..n)
                    .map(|i| {
                        let key = format!("{KEY_CART}_{i}");
                        metadata.get(&key).cloned().ok_or_else(|| MetadataError::Corrupt(format!("{key} is missing")))
                    })
                    .collect::<Result<String, _>>()?
            },
            None => field(KEY_CART)?,
        };
        let cart = serde_json::from_str::<Vec<CartLine>>(&cart_json)
            .map_err(|e| MetadataError::Corrupt(format!("Cart is not valid JSON. {e}")))?;
        validate_cart(&cart).map_err(MetadataError::Corrupt)?;
        Ok(Self {
            user_id: field(KEY_USER_ID)?,
            user_email: field(KEY_USER_EMAIL)?,
            user_name: field(KEY_USER_NAME)?,
            address: field(KEY_ADDRESS)?,
            phone: field(KEY_PHONE)?,
            cart,
        })
    }

    /// Creates the order record for this intent. The total is recomputed from the cart.
    pub fn into_new_order(
        self,
        id: OrderId,
        payment_method: PaymentMethod,
        otp: u32,
    ) -> Result<NewOrder, OrderFlowError> {
        let total_amount =
            self.total().ok_or_else(|| OrderFlowError::ValidationError("The cart total is too large".to_string()))?;
        Ok(NewOrder {
            id,
            user_id: self.user_id,
            user_email: self.user_email,
            user_name: self.user_name,
            address: self.address,
            phone: self.phone,
            cart: self.cart,
            total_amount,
            payment_method,
            status: OrderStatusType::Preparing,
            otp,
        })
    }
}
