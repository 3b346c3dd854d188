use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::OrderManagement,
    OrderFlowError,
};

/// Read access to orders, plus the admin status override.
pub struct OrdersApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi ({:?})", self.db)
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let order = self.db.fetch_order_by_id(order_id).await?;
        Ok(order)
    }

    /// The user's order history, newest first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.search_orders(OrderQueryFilter::default().with_user_id(user_id)).await?;
        trace!("🗃️ {} orders found for user {user_id}", orders.len());
        Ok(orders)
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }

    /// Sets the order status, whatever it currently is. Moving an order out of `delivered` or `cancelled` is allowed
    /// but logged.
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Order, OrderFlowError> {
        let current = self
            .db
            .fetch_order_by_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if current.status.is_terminal() && current.status != status {
            warn!("🗃️ Order {order_id} is being moved from {} back to {status}", current.status);
        }
        let order = self
            .db
            .update_order_status(order_id, status)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        info!("🗃️ Order {order_id} status changed from {} to {}", current.status, order.status);
        Ok(order)
    }
}
