//! `SqliteDatabase` is a concrete implementation of a Forge payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`PaymentStoreDatabase`] trait.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders};
use crate::{
    db_types::{FulfillmentUpdate, NewOrder, Order, OrderId, PaymentUpdate},
    order_objects::OrderQueryFilter,
    traits::{PaymentStoreDatabase, PaymentStoreError},
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

impl PaymentStoreDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn attach_merchant_tx(&self, order_id: &OrderId, merchant_tx_id: &str) -> Result<Order, PaymentStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::attach_merchant_tx(order_id, merchant_tx_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn apply_payment_update(
        &self,
        order_id: &OrderId,
        update: PaymentUpdate,
    ) -> Result<Order, PaymentStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::apply_payment_update(order_id, update, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} is now {} / payment {}", order.order_id, order.status, order.payment_status);
        Ok(order)
    }

    async fn update_fulfillment(
        &self,
        order_id: &OrderId,
        update: FulfillmentUpdate,
    ) -> Result<Order, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_fulfillment(order_id, update, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn close(&self) -> Result<(), PaymentStoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }
}
