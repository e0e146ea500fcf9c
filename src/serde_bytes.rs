//! Serde helpers for byte fields
//!
//! Byte arrays and buffers are rendered as `0x`-prefixed hex strings in
//! JSON so the FFI and CLI output is readable and round-trips.

use serde::{Deserialize, Deserializer, Serializer};

use crate::utils::hex_input::decode_hex_payload;

/// Serialize/deserialize [u8; 32] as 0x-prefixed hex string
pub mod hex32 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = decode_hex_payload(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

/// Serialize/deserialize [u8; 20] (account addresses) as 0x-prefixed hex
pub mod hex20 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 20], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 20], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = decode_hex_payload(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 20 bytes"))
    }
}

/// Serialize/deserialize Vec<u8> as 0x-prefixed hex string.
///
/// Deserialization accepts odd-length payloads the same way the CLI does.
pub mod hex_vec {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode_hex_payload(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::hex32")]
        hash: [u8; 32],
        #[serde(with = "super::hex_vec")]
        payload: Vec<u8>,
    }

    #[test]
    fn test_hex_fields_render_with_prefix() {
        let sample = Sample {
            hash: [0xab; 32],
            payload: vec![0x0a, 0xbc],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains(&format!("\"0x{}\"", "ab".repeat(32))));
        assert!(json.contains("\"0x0abc\""));

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let json = r#"{"hash":"0x1234","payload":"0x"}"#;
        assert!(serde_json::from_str::<Sample>(json).is_err());
    }
}
