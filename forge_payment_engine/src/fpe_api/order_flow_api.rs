use std::fmt::Debug;

use fpg_common::{helpers::order_id_from_merchant_tx_id, Paise};
use log::*;

use crate::{
    db_types::{
        FulfillmentUpdate,
        GatewayState,
        GatewayUpdate,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        PaymentStatusType,
        PaymentUpdate,
    },
    order_objects::OrderQueryFilter,
    traits::{PaymentStoreDatabase, PaymentStoreError},
};

/// `OrderFlowApi` is the primary API for handling order and payment flows in response to storefront checkouts and
/// payment gateway events.
///
/// Reconciliation is idempotent by construction. Every gateway event is reduced to a full overwrite of the order's
/// payment columns, and the [`Self::apply_gateway_update`] guard refuses transitions that would move an order
/// backwards, so duplicate webhook deliveries and webhook/poll races always converge on the same final state.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

/// Derive the order's payment columns from a gateway state and response code.
///
/// Only the exact pair `COMPLETED` / `SUCCESS` confirms an order. A definitive `FAILED` marks the payment failed
/// but leaves the order open for a retry. Everything else, including states this code has never seen, is treated
/// as still pending.
pub fn derive_payment_status(
    state: &GatewayState,
    response_code: Option<&str>,
) -> (PaymentStatusType, Option<OrderStatusType>) {
    match state {
        GatewayState::Completed if response_code == Some("SUCCESS") => {
            (PaymentStatusType::Success, Some(OrderStatusType::Confirmed))
        },
        GatewayState::Failed => (PaymentStatusType::Failed, None),
        _ => (PaymentStatusType::Pending, None),
    }
}

/// Whether a reconciled status may overwrite the current one.
///
/// `Success` is terminal. `Failed` may be overturned by a later `Success` (payment retries). Nothing regresses
/// to `Pending` once a definitive result has landed.
fn may_transition(current: PaymentStatusType, incoming: PaymentStatusType) -> bool {
    match (current, incoming) {
        (PaymentStatusType::Success, PaymentStatusType::Success) => true,
        (PaymentStatusType::Success, _) => false,
        (_, PaymentStatusType::Pending) => current == PaymentStatusType::Pending,
        _ => true,
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentStoreDatabase
{
    /// Store a brand-new order from a storefront checkout.
    ///
    /// The order must carry at least one line item. Totals saturate rather than wrap, so a saturated total
    /// means the line items were out of any plausible range and the order is refused. The returned record holds
    /// the freshly assigned order id.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, PaymentStoreError> {
        if order.items.is_empty() {
            return Err(PaymentStoreError::QueryError("Orders must contain at least one line item".to_string()));
        }
        if order.total_price >= Paise::MAX {
            return Err(PaymentStoreError::QueryError("Order total is out of range".to_string()));
        }
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order {} created. Total: {}", order.order_id, order.total_price);
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentStoreError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, PaymentStoreError> {
        trace!("🔄️📦️ Searching orders. {query}");
        self.db.search_orders(query).await
    }

    /// Record a freshly initiated payment attempt against its order.
    ///
    /// Called after the gateway has accepted a pay request, so that inbound events carrying this merchant
    /// transaction id can be correlated later.
    pub async fn register_payment_attempt(
        &self,
        order_id: &OrderId,
        merchant_tx_id: &str,
    ) -> Result<Order, PaymentStoreError> {
        let order = self.db.attach_merchant_tx(order_id, merchant_tx_id).await?;
        debug!("🔄️💰️ Payment attempt [{merchant_tx_id}] registered against order {order_id}");
        Ok(order)
    }

    /// Reconcile a gateway status envelope against its order.
    ///
    /// The order is identified by the order-id prefix of the merchant transaction id. The envelope is reduced to
    /// a payment status via [`derive_payment_status`] and applied as a full overwrite, unless the transition guard
    /// rejects it, in which case the order is returned untouched. Webhook callbacks and status polls both land
    /// here, so a race between the two is harmless.
    pub async fn apply_gateway_update(&self, update: GatewayUpdate) -> Result<Order, PaymentStoreError> {
        let mtx = update.merchant_tx_id.as_str();
        let order_id = order_id_from_merchant_tx_id(mtx)
            .ok_or_else(|| PaymentStoreError::InvalidMerchantTxId(mtx.to_string()))?;
        let order_id = OrderId::new(order_id).map_err(|e| PaymentStoreError::InvalidOrderId(e.to_string()))?;
        let order = self
            .db
            .fetch_order_by_order_id(&order_id)
            .await?
            .ok_or_else(|| PaymentStoreError::OrderNotFound(order_id.clone()))?;
        let (payment_status, new_order_status) = derive_payment_status(&update.state, update.response_code.as_deref());
        if !may_transition(order.payment_status, payment_status) {
            warn!(
                "🔄️💰️ Ignoring gateway update [{mtx}] for order {order_id}: {} does not supersede {}",
                payment_status, order.payment_status
            );
            return Ok(order);
        }
        let payment_update = PaymentUpdate {
            payment_status,
            merchant_tx_id: update.merchant_tx_id.clone(),
            payment_response: update.raw_response,
            new_order_status,
        };
        let order = self.db.apply_payment_update(&order_id, payment_update).await?;
        info!(
            "🔄️💰️ Order {order_id} reconciled from [{mtx}]: payment {}, order {}",
            order.payment_status, order.status
        );
        Ok(order)
    }

    /// Apply an admin fulfilment update to an order. Payment columns are never touched by this path.
    pub async fn update_fulfillment(
        &self,
        order_id: &OrderId,
        update: FulfillmentUpdate,
    ) -> Result<Order, PaymentStoreError> {
        if update.is_empty() {
            return Err(PaymentStoreError::QueryError("Fulfillment updates must change at least one field".to_string()));
        }
        let order = self.db.update_fulfillment(order_id, update).await?;
        info!("🔄️📦️ Order {order_id} fulfilment updated. Status: {}", order.status);
        Ok(order)
    }
}
