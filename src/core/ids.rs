//! Theme-authored identifiers.
//!
//! Themes name their cards, stats, resources, pools and combos with plain
//! strings ("coffee_break", "performance", "budget"). Each kind gets its own
//! newtype so a stat id can never be passed where a card id is expected.
//! All of them serialize as bare JSON strings.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a card definition ("what card is this"), not a copy.
    CardId,
    "Card"
);

string_id!(
    /// Identifies a bounded player stat (performance, health, ...).
    StatId,
    "Stat"
);

string_id!(
    /// Identifies a floor-zero player resource (money, energy, ...).
    ResourceId,
    "Resource"
);

string_id!(
    /// Identifies a shared resource pool.
    PoolId,
    "Pool"
);

string_id!(
    /// Identifies a combo definition.
    ComboId,
    "Combo"
);
