use forge_payment_engine::{
    db_types::{FulfillmentUpdate, NewOrder, Order, OrderId, PaymentUpdate},
    order_objects::OrderQueryFilter,
    traits::{PaymentStoreDatabase, PaymentStoreError},
};
use mockall::mock;

mock! {
    pub PaymentStore {}
    impl Clone for PaymentStore {
        fn clone(&self) -> Self;
    }
    impl PaymentStoreDatabase for PaymentStore {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentStoreError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentStoreError>;
        async fn attach_merchant_tx(&self, order_id: &OrderId, merchant_tx_id: &str) -> Result<Order, PaymentStoreError>;
        async fn apply_payment_update(&self, order_id: &OrderId, update: PaymentUpdate) -> Result<Order, PaymentStoreError>;
        async fn update_fulfillment(&self, order_id: &OrderId, update: FulfillmentUpdate) -> Result<Order, PaymentStoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentStoreError>;
        async fn close(&self) -> Result<(), PaymentStoreError>;
    }
}
