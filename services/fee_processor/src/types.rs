//! Identifiers shared by the engine and its collaborators

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identity (wallets, contracts, the engine itself)
pub type AccountId = Address;

/// Liquidity pool identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub Address);

/// Asset (token) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub Address);

impl PoolId {
    pub fn address(&self) -> Address {
        self.0
    }
}

impl AssetId {
    pub fn address(&self) -> Address {
        self.0
    }
}

impl From<Address> for PoolId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<Address> for AssetId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

// Full hex; the H160 Display impl abbreviates to 0x1234…abcd
impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
