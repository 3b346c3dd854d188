//! # Storefront engine public API
//!
//! The API is split by concern, and each part only asks of its backend the traits it needs:
//!
//! * [`order_flow_api`] places orders and reconciles paid checkout sessions into orders. Needs [`OrderManagement`]
//!   and a [`PaymentSessionProvider`].
//! * [`orders_api`] looks orders up and lets admins change their status. Needs [`OrderManagement`].
//! * [`auth_api`] registers users and manages their roles. Needs [`UserManagement`].
//!
//! ```rust,ignore
//! use storefront_engine::{OrdersApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/storefront.db", 5).await?;
//! let api = OrdersApi::new(db);
//! let history = api.orders_for_user("uid_123").await?;
//! ```
//!
//! [`OrderManagement`]: crate::traits::OrderManagement
//! [`UserManagement`]: crate::traits::UserManagement
//! [`PaymentSessionProvider`]: crate::traits::PaymentSessionProvider
pub mod auth_api;
pub mod checkout_objects;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod orders_api;
