use phonepe_tools::helpers::sha256_hex;

/// Validate an `X-VERIFY` header against the raw request body.
///
/// The header carries `hex(sha256(body + saltKey))###saltIndex`. The salt index is checked first, before any
/// hashing, so a request signed with a key generation we do not hold is rejected cheaply. The digest comparison
/// is constant time.
pub fn check_x_verify(header: &str, body: &[u8], salt_key: &str, salt_index: u8) -> bool {
    let Some((digest, index)) = header.split_once("###") else {
        return false;
    };
    if index != salt_index.to_string() {
        return false;
    }
    let expected = sha256_hex(&[body, salt_key.as_bytes()].concat());
    constant_time_eq(digest.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
