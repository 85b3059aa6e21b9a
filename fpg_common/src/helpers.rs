/// Extract the order id embedded as the prefix of a merchant transaction id (`{orderId}_{epochMillis}_{rand8hex}`).
///
/// Returns `None` when the id does not carry the expected shape. Order ids are underscore-free by construction,
/// so the prefix parse cannot be ambiguous.
pub fn order_id_from_merchant_tx_id(merchant_tx_id: &str) -> Option<&str> {
    match merchant_tx_id.split_once('_') {
        Some((order_id, _)) if !order_id.is_empty() => Some(order_id),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::order_id_from_merchant_tx_id;

    #[test]
    fn order_id_extraction() {
        assert_eq!(order_id_from_merchant_tx_id("482_1699999999999_a1b2c3d4"), Some("482"));
        assert_eq!(order_id_from_merchant_tx_id("_1699999999999_a1b2c3d4"), None);
        assert_eq!(order_id_from_merchant_tx_id("no-underscore"), None);
    }
}
