//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the storage traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{db_url, new_pool, orders, users};
use crate::{
    db_types::{NewOrder, NewUser, Order, OrderId, OrderStatusType, Role, UserAccount},
    order_objects::OrderQueryFilter,
    traits::{InsertOrderResult, OrderManagement, StoreError, UserManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(order_id, &mut conn).await
    }

    async fn insert_order_if_absent(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order_if_absent(order, &mut conn).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        trace!("🗃️ Setting status of order {order_id} to {status}");
        orders::update_order_status(order_id, status, &mut conn).await
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders(query, &mut conn).await
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user(&self, uid: &str) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(uid, &mut conn).await
    }

    async fn insert_user_if_absent(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user_if_absent(user, &mut conn).await
    }

    async fn update_user_role(&self, uid: &str, role: Role) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::update_user_role(uid, role, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `SFS_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
