use chrono::Utc;
use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::{InsertOrderResult, StoreError},
};

const ORDER_COLUMNS: &str = "id, user_id, user_email, user_name, address, phone, cart, total_amount, payment_method, \
                             status, otp, created_at, updated_at";

/// Inserts the order unless its id is already taken, in a single statement.
///
/// `ON CONFLICT DO NOTHING` makes the insert a no-op for an existing id, in which case `RETURNING` yields no row and the
/// stored order is fetched instead. The stored order is never modified.
///
/// Queries in this module are always drained with `fetch_all`. A statement that is not stepped to completion keeps its
/// implicit transaction open on the pooled connection, and other connections do not see the write.
pub async fn insert_order_if_absent(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, StoreError> {
    let now = Utc::now();
    let inserted = sqlx::query_as::<_, Order>(&format!(
        r#"
            INSERT INTO orders ({ORDER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT(id) DO NOTHING
            RETURNING {ORDER_COLUMNS};
        "#
    ))
    .bind(order.id.as_str())
    .bind(&order.user_id)
    .bind(&order.user_email)
    .bind(&order.user_name)
    .bind(&order.address)
    .bind(&order.phone)
    .bind(Json(&order.cart))
    .bind(order.total_amount)
    .bind(order.payment_method.to_string())
    .bind(order.status.to_string())
    .bind(i64::from(order.otp))
    .bind(now)
    .bind(now)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .next();
    match inserted {
        Some(order) => {
            debug!("🗃️ Order {} has been saved in the DB", order.id);
            Ok(InsertOrderResult::Inserted(order))
        },
        None => {
            let existing = fetch_order_by_id(&order.id, conn)
                .await?
                .ok_or_else(|| StoreError::InsertFailed(order.id.clone()))?;
            debug!("🗃️ Order {} already exists. The stored order was left as is.", existing.id);
            Ok(InsertOrderResult::AlreadyExists(existing))
        },
    }
}

pub async fn fetch_order_by_id(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?
        .into_iter()
        .next();
    Ok(order)
}

pub async fn update_order_status(
    order_id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(status.to_string())
    .bind(Utc::now())
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?
    .into_iter()
    .next();
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn fetch_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, StoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(user_id) = query.user_id {
        where_clause.push("user_id = ");
        where_clause.push_bind_unseparated(user_id);
    }
    if !query.statuses.is_empty() {
        where_clause.push("status IN (");
        for (i, status) in query.statuses.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status.to_string());
        }
        where_clause.push_unseparated(")");
    }
    if let Some(method) = query.payment_method {
        where_clause.push("payment_method = ");
        where_clause.push_bind_unseparated(method.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, rowid DESC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of fetch_orders: {:?}", orders.len());
    Ok(orders)
}
