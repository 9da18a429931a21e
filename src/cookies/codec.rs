//! Cookie value encoding.
//!
//! Values are written as compact JSON and then base64url encoded without padding,
//! so the wire value only ever contains `[A-Za-z0-9_-]` and never needs quoting.
//! `decode(encode(v)) == v` for every JSON value.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::CookieError;

/// Encoded form of the boolean `false`.
pub const FALSE_SENTINEL: &str = "ZmFsc2U";

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CookieError> {
    let json = serde_json::to_vec(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(raw: &str) -> Result<Value, CookieError> {
    decode_as(raw)
}

pub fn decode_as<T: DeserializeOwned>(raw: &str) -> Result<T, CookieError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(raw.as_bytes())
        .map_err(|e| CookieError::Decode(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| CookieError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn false_sentinel_matches_encoder() {
        assert_eq!(encode(&false).unwrap(), FALSE_SENTINEL);
    }

    #[test]
    fn wire_alphabet_is_cookie_safe() {
        let raw = encode(&json!({"user": "Awilum", "tags": ["a; b", "c,d"], "n": 1.5})).unwrap();
        assert!(raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn decodes_nested_values() {
        let v = json!({"cart": [1, 2, 3], "name": "ünïcode", "none": null});
        assert_eq!(decode(&encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode("not base64!"), Err(CookieError::Decode(_))));
        // valid base64, not JSON
        let raw = URL_SAFE_NO_PAD.encode("{oops");
        assert!(matches!(decode(&raw), Err(CookieError::Decode(_))));
    }

    #[test]
    fn typed_decode_checks_shape() {
        let raw = encode(&json!([1, 2])).unwrap();
        assert_eq!(decode_as::<Vec<u8>>(&raw).unwrap(), vec![1, 2]);
        assert!(decode_as::<String>(&raw).is_err());
    }
}
