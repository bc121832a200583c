/*
[INPUT]:  Timestamp, API secret bytes and request parameters
[OUTPUT]: Uppercase hex HMAC-SHA256 request signatures
[POS]:    Auth layer - request signing shared by REST and WebSocket auth
[UPDATE]: When changing the canonical message format or digest
*/

use std::collections::BTreeMap;
use std::fmt::Display;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::http::{Result, WooError};

type HmacSha256 = Hmac<Sha256>;

/// Parameter set used when only the timestamp is signed (GET and WS auth).
pub const NO_PARAMS: [(&str, &str); 0] = [];

/// Current time as milliseconds since the Unix epoch, decimal encoded.
pub fn timestamp_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Build the canonical message that gets signed.
///
/// Format: "{k1}={v1}&{k2}={v2}|{timestamp}" with keys sorted ascending.
/// An empty parameter set yields "|{timestamp}".
pub fn canonical_message<I, K, V>(timestamp: &str, params: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Display,
{
    let mut sorted = BTreeMap::new();
    for (key, value) in params {
        let key = key.into();
        if key.is_empty() {
            return Err(WooError::SignatureInput("empty parameter key".to_string()));
        }
        if sorted.insert(key.clone(), value.to_string()).is_some() {
            return Err(WooError::SignatureInput(format!(
                "duplicate parameter key: {key}"
            )));
        }
    }

    let mut message = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    message.push('|');
    message.push_str(timestamp);
    Ok(message)
}

/// Sign a request the way WOO X authenticates REST calls and WebSocket logins.
///
/// Returns the uppercase hex HMAC-SHA256 of [`canonical_message`] keyed by `secret`.
pub fn sign<I, K, V>(timestamp: &str, secret: &[u8], params: I) -> Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Display,
{
    let message = canonical_message(timestamp, params)?;
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|err| WooError::SignatureInput(err.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode_upper(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ORDER_SIGNATURE: &str =
        "61455B34FAFB96D93D3B9CFB79E60038723B83DA8BFEBCAA166BD2B9BFB4253A";

    #[test]
    fn test_empty_params_fixture() {
        let signature = sign("1000", b"abc", NO_PARAMS).unwrap();
        assert_eq!(
            signature,
            "7251255205C6699C8210AA405818AF69D22CED573867894CF71CF1D5390EBA5E"
        );
    }

    #[test]
    fn test_canonical_message_sorts_keys() {
        let message = canonical_message(
            "1578963600000",
            [("symbol", "SPOT_BTC_USDT"), ("side", "BUY"), ("order_type", "LIMIT")],
        )
        .unwrap();
        assert_eq!(
            message,
            "order_type=LIMIT&side=BUY&symbol=SPOT_BTC_USDT|1578963600000"
        );
    }

    #[rstest]
    #[case::declared(vec![
        ("symbol", "SPOT_BTC_USDT"),
        ("order_type", "LIMIT"),
        ("order_price", "9000"),
        ("order_quantity", "0.11"),
        ("side", "BUY"),
    ])]
    #[case::sorted(vec![
        ("order_price", "9000"),
        ("order_quantity", "0.11"),
        ("order_type", "LIMIT"),
        ("side", "BUY"),
        ("symbol", "SPOT_BTC_USDT"),
    ])]
    #[case::reversed(vec![
        ("symbol", "SPOT_BTC_USDT"),
        ("side", "BUY"),
        ("order_type", "LIMIT"),
        ("order_quantity", "0.11"),
        ("order_price", "9000"),
    ])]
    fn test_signature_ignores_insertion_order(#[case] params: Vec<(&str, &str)>) {
        let signature = sign("1578963600000", b"secret", params).unwrap();
        assert_eq!(signature, ORDER_SIGNATURE);
    }

    #[test]
    fn test_values_are_stringified() {
        let numeric = sign(
            "1578963600000",
            b"secret",
            [("order_quantity", 0.11), ("order_price", 9000.0)],
        )
        .unwrap();
        let text = sign(
            "1578963600000",
            b"secret",
            [("order_price", "9000"), ("order_quantity", "0.11")],
        )
        .unwrap();
        assert_eq!(numeric, text);
    }

    #[test]
    fn test_signature_is_uppercase_hex() {
        let signature = sign(&timestamp_millis(), b"another-secret", NO_PARAMS).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[rstest]
    #[case::empty_key(vec![("", "1")])]
    #[case::duplicate_key(vec![("symbol", "A"), ("symbol", "B")])]
    fn test_malformed_params_rejected(#[case] params: Vec<(&str, &str)>) {
        let err = sign("1000", b"abc", params).unwrap_err();
        assert!(matches!(err, WooError::SignatureInput(_)));
    }

    #[test]
    fn test_timestamp_is_millis() {
        let timestamp: i64 = timestamp_millis().parse().unwrap();
        // 2020-01-01 in milliseconds
        assert!(timestamp > 1_577_836_800_000);
    }
}
