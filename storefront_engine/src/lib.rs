//! Storefront Engine
//!
//! The storefront engine turns shopping carts into orders. It knows nothing about HTTP or about any particular payment
//! provider; the server supplies both.
//!
//! The library is divided into three main sections:
//! 1. Backend contracts ([`mod@traits`]). Storage for orders and users, and the hosted-checkout payment provider, are
//!    described by traits. [`SqliteDatabase`] implements the storage traits.
//! 2. The data types ([`mod@db_types`]) shared by every layer.
//! 3. The public API. [`OrderFlowApi`] places orders and reconciles paid checkout sessions exactly once,
//!    [`OrdersApi`] serves order lookups and status changes, and [`AuthApi`] manages users and roles.
pub mod db_types;
pub mod helpers;
pub mod traits;

mod sf_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sf_api::{
    auth_api::AuthApi,
    checkout_objects,
    errors::{AuthApiError, OrderFlowError},
    order_flow_api::OrderFlowApi,
    order_objects,
    orders_api::OrdersApi,
};
