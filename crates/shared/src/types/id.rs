//! Typed names for type-safe references to ledger master data.
//!
//! Ledger records are addressed by their human-readable name (e.g. `"Cash - ACME"`).
//! Wrapping each name prevents accidentally passing a `CostCenterId` where an
//! `AccountId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed name wrappers.
macro_rules! typed_name {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Creates an identifier from a record name.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the record name.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner name.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns true if the name is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_name!(CompanyId, "Name of the company a voucher is booked for.");
typed_name!(AccountId, "Name of a chart of accounts entry.");
typed_name!(CostCenterId, "Name of a cost center.");
typed_name!(VoucherNo, "Document number of a posted or draft voucher.");
