use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::InsertOrderResult,
};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} could neither be inserted nor found")]
    InsertFailed(OrderId),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines the behaviour for storing and querying orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Atomically creates the order unless one with the same id already exists.
    ///
    /// Implementations must never overwrite an existing order. When two callers race with the same id, exactly one
    /// receives [`InsertOrderResult::Inserted`] and the other receives [`InsertOrderResult::AlreadyExists`] carrying
    /// the winner's row.
    async fn insert_order_if_absent(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError>;

    /// Overwrites the status of an order. Returns the updated order, or `None` if no order has the given id.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, StoreError>;

    /// Returns the orders matching the filter, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError>;
}
