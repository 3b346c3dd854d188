use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_engine::{
    db_types::{OrderId, OrderStatusType, PaymentMethod, Role},
    order_objects::OrderQueryFilter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmOrderQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOrder {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleCheck {
    pub admin: bool,
}

/// Query parameters for the admin order list. `status` may hold several comma-separated statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub payment_method: Option<String>,
}

impl TryFrom<AdminOrdersQuery> for OrderQueryFilter {
    type Error = String;

    fn try_from(query: AdminOrdersQuery) -> Result<Self, Self::Error> {
        let mut filter = OrderQueryFilter::default();
        if let Some(statuses) = query.status {
            for s in statuses.split(',').map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
                let status = s.parse::<OrderStatusType>().map_err(|e| e.to_string())?;
                filter = filter.with_status(status);
            }
        }
        if let Some(uid) = query.user_id.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_user_id(uid.trim());
        }
        if let Some(method) = query.payment_method.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_payment_method(method.parse::<PaymentMethod>().map_err(|e| e.to_string())?);
        }
        Ok(filter)
    }
}
