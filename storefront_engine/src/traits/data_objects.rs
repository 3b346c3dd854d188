use crate::db_types::Order;

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// An order with the same id was already stored. The stored order is returned unchanged.
    AlreadyExists(Order),
}

impl InsertOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOrderResult::Inserted(_))
    }
}
