use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a merchant transaction id for a new payment attempt: `{orderId}_{epochMillis}_{random8hex}`.
///
/// The id is unique per *attempt*, not per order, so a customer can retry payment after a failed initiation.
/// The order id is embedded as the prefix so that inbound gateway events can be correlated back to an order.
/// Order ids are underscore-free by construction (see the payment engine), which keeps the prefix parse unambiguous.
pub fn new_merchant_tx_id(order_id: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce: u32 = rand::thread_rng().gen();
    format!("{order_id}_{millis}_{nonce:08x}")
}

pub use fpg_common::helpers::order_id_from_merchant_tx_id;

/// Compute the `X-VERIFY` header value for a request: `hex(sha256(payload + saltKey))###saltIndex`.
///
/// Payment initiation signs the base64-encoded request envelope; status checks sign the empty payload.
pub fn x_verify(payload: &str, salt_key: &str, salt_index: u8) -> String {
    let digest = sha256_hex(&[payload.as_bytes(), salt_key.as_bytes()].concat());
    format!("{digest}###{salt_index}")
}

pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().fold(String::with_capacity(64), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}
