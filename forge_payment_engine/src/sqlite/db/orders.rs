use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{FulfillmentUpdate, NewOrder, Order, OrderId, PaymentUpdate},
    order_objects::OrderQueryFilter,
    traits::PaymentStoreError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// A fresh order id is assigned here, so the caller never has to worry about collisions.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentStoreError> {
    let order_id = OrderId::random();
    // A serialization failure here is our fault, not the client's, so it surfaces as a database error.
    let customer = serde_json::to_string(&order.customer)
        .map_err(|e| PaymentStoreError::DatabaseError(format!("Could not serialize customer info. {e}")))?;
    let items = serde_json::to_string(&order.items)
        .map_err(|e| PaymentStoreError::DatabaseError(format!("Could not serialize line items. {e}")))?;
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer,
                items,
                total_price,
                payment_method
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(customer)
    .bind(items)
    .bind(order.total_price)
    .bind(order.payment_method)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

/// Returns the entry in the orders table for the corresponding `order_id`
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the entry in the orders table carrying the given merchant transaction id, if any.
pub async fn fetch_order_by_merchant_tx_id(
    merchant_tx_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE merchant_tx_id = $1")
        .bind(merchant_tx_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Records the merchant transaction id of the latest payment attempt against the order.
///
/// Each attempt gets a fresh id, so a second attach on the same order simply replaces the previous id.
/// Attaching an id that is already recorded against a different order is a conflict.
pub async fn attach_merchant_tx(
    order_id: &OrderId,
    merchant_tx_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentStoreError> {
    if let Some(existing) = fetch_order_by_merchant_tx_id(merchant_tx_id, &mut *conn).await? {
        if &existing.order_id != order_id {
            return Err(PaymentStoreError::MerchantTxConflict(merchant_tx_id.to_string()));
        }
    }
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                merchant_tx_id = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $2
            RETURNING *;
        "#,
    )
    .bind(merchant_tx_id)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| PaymentStoreError::OrderNotFound(order_id.clone()))?;
    debug!("🗃️ Attached merchant tx id [{merchant_tx_id}] to order [{order_id}]");
    Ok(order)
}

/// Overwrites the payment columns of the order with the reconciled result.
///
/// The order status is only touched when the update carries a new one; otherwise it is left as-is.
/// Since every column is overwritten rather than merged, replaying the same update is harmless.
pub async fn apply_payment_update(
    order_id: &OrderId,
    update: PaymentUpdate,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentStoreError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = $1,
                merchant_tx_id = $2,
                payment_response = $3,
                status = COALESCE($4, status),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $5
            RETURNING *;
        "#,
    )
    .bind(update.payment_status)
    .bind(update.merchant_tx_id)
    .bind(update.payment_response)
    .bind(update.new_order_status)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| PaymentStoreError::OrderNotFound(order_id.clone()))?;
    Ok(order)
}

/// Updates the order lifecycle status and tracking fields. Absent fields are left untouched.
pub async fn update_fulfillment(
    order_id: &OrderId,
    update: FulfillmentUpdate,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentStoreError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET
                status = COALESCE($1, status),
                tracking_number = COALESCE($2, tracking_number),
                tracking_url = COALESCE($3, tracking_url),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $4
            RETURNING *;
        "#,
    )
    .bind(update.new_status)
    .bind(update.tracking_number)
    .bind(update.tracking_url)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| PaymentStoreError::OrderNotFound(order_id.clone()))?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.email {
        where_clause.push("lower(json_extract(customer, '$.email')) LIKE ");
        where_clause.push_bind_unseparated(format!("%{}%", email.to_lowercase()));
    }
    if let Some(phone) = query.phone {
        where_clause.push("json_extract(customer, '$.phone') LIKE ");
        where_clause.push_bind_unseparated(format!("%{phone}%"));
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
