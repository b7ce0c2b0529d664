//! Account identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 32-byte account identifier (a public key hash or equivalent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

#[derive(Debug, Error)]
pub enum AccountIdError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl AccountId {
    /// Build an identifier from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic identifier from an arbitrary seed string.
    /// Used for fixtures and tests; real deployments map keys directly.
    pub fn from_seed(seed: &str) -> Self {
        let hash = blake3::hash(seed.as_bytes());
        Self(*hash.as_bytes())
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, AccountIdError> {
        let bytes = hex::decode(s)?;
        let len = bytes.len();
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AccountIdError::InvalidLength(len))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_deterministic() {
        let a = AccountId::from_seed("alice");
        let b = AccountId::from_seed("alice");
        let c = AccountId::from_seed("bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hex_round_trip() {
        let a = AccountId::from_seed("alice");
        let parsed = AccountId::from_hex(&a.to_string()).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(AccountId::from_hex("zz").is_err());
        assert!(AccountId::from_hex("abcd").is_err());
    }
}
