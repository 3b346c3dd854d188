//! # Backend contracts
//!
//! The traits in this module are the seams between the engine's APIs and the outside world.
//!
//! * [`OrderManagement`] stores and queries orders. Creation is only possible through the atomic
//!   [`OrderManagement::insert_order_if_absent`], which is what makes order materialisation idempotent.
//! * [`UserManagement`] stores user accounts and their roles.
//! * [`PaymentSessionProvider`] is the hosted-checkout processor. The engine never talks to a payment provider
//!   directly; the server supplies an implementation.
mod order_management;
mod payment_sessions;
mod user_management;

mod data_objects;

pub use data_objects::InsertOrderResult;
pub use order_management::{OrderManagement, StoreError};
pub use payment_sessions::{PaymentProviderError, PaymentSessionProvider};
pub use user_management::UserManagement;
