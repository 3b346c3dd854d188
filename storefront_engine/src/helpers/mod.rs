use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderId;

pub const ORDER_ID_LENGTH: usize = 20;

/// A fresh random identifier for orders that do not come with a checkout session id.
pub fn new_order_id() -> OrderId {
    let id = rand::thread_rng().sample_iter(&Alphanumeric).take(ORDER_ID_LENGTH).map(char::from).collect::<String>();
    OrderId(id)
}

/// A six-digit delivery confirmation code.
pub fn new_otp() -> u32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}
