//! Asset identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a transferable asset (the staked asset or a reward asset).
///
/// Held as a registry symbol; the ledger never inspects it beyond equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_equality() {
        assert_eq!(AssetId::new("STAKE"), AssetId::new("STAKE"));
        assert_ne!(AssetId::new("STAKE"), AssetId::new("RWD"));
    }

    #[test]
    fn test_serde_round_trip() {
        let asset = AssetId::new("RWD-1");
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(serde_json::from_str::<AssetId>(&json).unwrap(), asset);
    }
}
