use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sf_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       SessionId       ---------------------------------------------------------
/// The payment provider's identifier for a hosted checkout session. Online orders are keyed by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SessionId> for OrderId {
    fn from(id: SessionId) -> Self {
        Self(id.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been accepted and is being put together. All orders start here.
    Preparing,
    Pending,
    /// The order is with the courier.
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 5] = [
        OrderStatusType::Preparing,
        OrderStatusType::Pending,
        OrderStatusType::Processing,
        OrderStatusType::Delivered,
        OrderStatusType::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Preparing => write!(f, "preparing"),
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Delivered => write!(f, "delivered"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preparing" => Ok(Self::Preparing),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "CASH_ON_DELIVERY", alias = "COD")]
    CashOnDelivery,
    #[serde(rename = "ONLINE")]
    Online,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::CashOnDelivery => write!(f, "CASH_ON_DELIVERY"),
            PaymentMethod::Online => write!(f, "ONLINE"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH_ON_DELIVERY" | "COD" => Ok(Self::CashOnDelivery),
            "ONLINE" => Ok(Self::Online),
            _ => Err(ConversionError(format!("Unsupported payment method: {s}"))),
        }
    }
}

//--------------------------------------        CartLine       ---------------------------------------------------------
/// One line of a shopping cart. Older storefront builds send `id` and `price` instead of `productId` and `unitPrice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default, alias = "id")]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "price")]
    pub unit_price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub color: String,
    pub quantity: i64,
}

impl CartLine {
    /// `None` if the line total cannot be represented.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// The order total is always derived from the cart, never taken from a caller or the payment provider.
///
/// Prices and quantities come from the client, so the sum is checked. `None` means the total overflows.
pub fn cart_total(cart: &[CartLine]) -> Option<Money> {
    cart.iter().try_fold(Money::default(), |total, line| total.checked_add(line.line_total()?))
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: OrderId,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub address: String,
    pub phone: String,
    pub cart: Vec<CartLine>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub otp: u32,
}

//--------------------------------------          Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub address: String,
    pub phone: String,
    pub cart: Vec<CartLine>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub status: OrderStatusType,
    pub otp: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------          Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

//--------------------------------------     Row decoding      ---------------------------------------------------------
#[cfg(feature = "sqlite")]
mod sqlite_rows {
    use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row};

    use super::*;

    fn decode_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> sqlx::Error {
        sqlx::Error::Decode(Box::new(e))
    }

    impl<'r> FromRow<'r, SqliteRow> for Order {
        fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
            let Json(cart) = row.try_get::<Json<Vec<CartLine>>, _>("cart")?;
            let payment_method = row.try_get::<String, _>("payment_method")?.parse().map_err(decode_err)?;
            let status = row.try_get::<String, _>("status")?.parse().map_err(decode_err)?;
            let otp = u32::try_from(row.try_get::<i64, _>("otp")?).map_err(decode_err)?;
            Ok(Self {
                id: OrderId(row.try_get("id")?),
                user_id: row.try_get("user_id")?,
                user_email: row.try_get("user_email")?,
                user_name: row.try_get("user_name")?,
                address: row.try_get("address")?,
                phone: row.try_get("phone")?,
                cart,
                total_amount: row.try_get("total_amount")?,
                payment_method,
                status,
                otp,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        }
    }

    impl<'r> FromRow<'r, SqliteRow> for UserAccount {
        fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
            let role = row.try_get::<String, _>("role")?.parse().map_err(decode_err)?;
            Ok(Self {
                uid: row.try_get("uid")?,
                email: row.try_get("email")?,
                display_name: row.try_get("display_name")?,
                photo_url: row.try_get("photo_url")?,
                role,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        }
    }
}
