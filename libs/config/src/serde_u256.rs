//! Decimal-string serde for U256 amounts
//!
//! The ethers serde impl uses `0x` hex, which is unreadable for token
//! thresholds. Config files and environment overrides store amounts as
//! decimal strings; plain TOML integers are accepted for small values.

use ethers_core::types::U256;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    deserializer.deserialize_any(U256Visitor)
}

struct U256Visitor;

impl<'de> Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or decimal string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<U256, E> {
        Ok(U256::from(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<U256, E> {
        Ok(U256::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<U256, E> {
        u64::try_from(value)
            .map(U256::from)
            .map_err(|_| E::custom(format!("amount must be non-negative, got {}", value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<U256, E> {
        let digits: String = value.trim().chars().filter(|c| *c != '_').collect();
        U256::from_dec_str(&digits)
            .map_err(|e| E::custom(format!("invalid decimal amount {:?}: {:?}", value, e)))
    }
}
