//! Asset identifiers
//!
//! Every balance in the exchange is keyed by an `AssetId`: either the
//! native base asset (value carried by the call itself) or a token
//! contract identified by its address. Keeping the two kinds in one type
//! lets the ledger treat all assets uniformly while the gateway rejects
//! cross-kind misuse at its boundary.

use crate::ids::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Textual form of the native asset, used by `Display`/`FromStr`.
const NATIVE_TAG: &str = "native";

/// Identifier of an asset held in exchange custody.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetId {
    /// The chain's base unit of value, deposited directly rather than
    /// through a token contract's approve/transfer handshake.
    Native,
    /// A fungible token contract, identified by its address.
    Token(Address),
}

impl AssetId {
    /// Identifier for the token at `address`.
    pub fn token(address: impl Into<Address>) -> Self {
        Self::Token(address.into())
    }

    /// Check whether this is the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }

    /// The token contract address, if this is a token asset.
    pub fn token_address(&self) -> Option<&Address> {
        match self {
            AssetId::Native => None,
            AssetId::Token(addr) => Some(addr),
        }
    }
}

impl From<Address> for AssetId {
    fn from(address: Address) -> Self {
        Self::Token(address)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Native => write!(f, "{NATIVE_TAG}"),
            AssetId::Token(addr) => write!(f, "{addr}"),
        }
    }
}

/// Error parsing an asset identifier from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAssetError {
    #[error("Empty asset identifier")]
    Empty,
}

impl FromStr for AssetId {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseAssetError::Empty);
        }
        if s.eq_ignore_ascii_case(NATIVE_TAG) {
            Ok(AssetId::Native)
        } else {
            Ok(AssetId::Token(Address::new(s)))
        }
    }
}
