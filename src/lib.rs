//! ipasn - Offline IP to ASN Lookup
//!
//! ipasn answers "which autonomous system, country and organization own this
//! address?" from a static range database such as the iptoasn.com `ip2asn`
//! dumps, without any network access.
//!
//! # Quick Start
//!
//! ```rust
//! use ipasn::AsnDatabase;
//!
//! let mut builder = AsnDatabase::builder();
//! builder.add_row(["1.0.0.0", "1.0.0.255", "13335", "US", "CLOUDFLARENET"]).unwrap();
//! builder.add_row(["8.8.8.0", "8.8.8.255", "15169", "US", "GOOGLE"]).unwrap();
//! let db = builder.build()?;
//!
//! let info = db.lookup_str("8.8.8.8");
//! assert_eq!(info.asn.to_string(), "15169");
//! assert_eq!(info.org.to_string(), "GOOGLE");
//!
//! // Misses and unparseable input share one explicit result
//! assert_eq!(db.lookup_str("9.9.9.9").org.to_string(), "Not found");
//! assert_eq!(db.lookup_str("not an ip").org.to_string(), "Not found");
//! # Ok::<(), ipasn::AsnError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  loader / file_reader        │  delimited text, .gz, stdin
//! └──────────────┬───────────────┘
//!                ↓ raw rows
//! ┌──────────────────────────────┐
//! │  AsnDatabaseBuilder          │  validate, normalize, count drops
//! └──────────────┬───────────────┘
//!                ↓ sorted once
//! ┌──────────────────────────────┐
//! │  AsnDatabase                 │
//! │   ├─ RangeIndex<u32>   IPv4  │  binary search, O(log n)
//! │   └─ RangeIndex<u128>  IPv6  │
//! └──────────────────────────────┘
//! ```
//!
//! The database is immutable once built and can be shared across threads
//! without locking.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Database builder and row validation
pub mod builder;
/// Per-family IP-to-ASN database
pub mod database;
/// Error types for ipasn operations
pub mod error;
pub mod file_reader;
/// Sorted range index
pub mod index;
/// Delimited database loader
pub mod loader;
pub mod record;

pub use crate::builder::{AsnDatabaseBuilder, BuildStats, OverlapPolicy, RowError};
pub use crate::database::{AsnDatabase, RangeMatch};
pub use crate::error::{AsnError, Result};
pub use crate::index::RangeIndex;
pub use crate::loader::{load_database, Delimiter, LoadOptions};
pub use crate::record::{Asn, AsnInfo, Country, Org, RangeKey, RangeRecord};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
