use crate::{
    db_types::{FulfillmentUpdate, NewOrder, Order, OrderId, PaymentUpdate},
    order_objects::OrderQueryFilter,
    traits::PaymentStoreError,
};

/// This trait defines the storage behaviour backends must supply to the payment engine.
///
/// This behaviour includes:
/// * Creating and fetching order records
/// * Attaching merchant transaction ids when a payment attempt is initiated
/// * Applying reconciled payment results and admin fulfilment updates
#[allow(async_fn_in_trait)]
pub trait PaymentStoreDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Store a new order and return the full record, including its assigned row id and timestamps.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentStoreError>;

    /// Fetch the order with the given public order id, if it exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentStoreError>;

    /// Record the merchant transaction id for the latest payment attempt against the order.
    ///
    /// Merchant transaction ids are unique per attempt; attaching an id that is already recorded against a
    /// *different* order is a [`PaymentStoreError::MerchantTxConflict`]. Re-attaching the same id to the same
    /// order is a no-op, so the call is idempotent.
    async fn attach_merchant_tx(&self, order_id: &OrderId, merchant_tx_id: &str) -> Result<Order, PaymentStoreError>;

    /// Apply a reconciled payment result to the order.
    ///
    /// This is a full overwrite of the payment columns (and the order status, when the update carries one).
    /// Applying the same update twice leaves the record in the same state as applying it once.
    /// Returns the updated order record.
    async fn apply_payment_update(&self, order_id: &OrderId, update: PaymentUpdate) -> Result<Order, PaymentStoreError>;

    /// Apply an admin fulfilment update (lifecycle status and tracking fields) to the order.
    async fn update_fulfillment(
        &self,
        order_id: &OrderId,
        update: FulfillmentUpdate,
    ) -> Result<Order, PaymentStoreError>;

    /// Fetch orders matching the given filter, most recent first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentStoreError>;

    /// Close the connection pool.
    async fn close(&self) -> Result<(), PaymentStoreError>;
}
