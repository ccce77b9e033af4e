//! IP-to-ASN database
//!
//! An [`AsnDatabase`] pairs an IPv4 [`RangeIndex`] with an IPv6 one. Each
//! query is routed to the index of its own family, so IPv4 and IPv6 keys can
//! never collide numerically. IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`)
//! are IPv6 queries and only match IPv6 ranges.
//!
//! The database is immutable and `Sync`; share one instance (by reference or
//! `Arc`) across as many threads as needed.

use crate::builder::{AsnDatabaseBuilder, BuildStats};
use crate::error::Result;
use crate::index::RangeIndex;
use crate::loader::{self, LoadOptions};
use crate::record::{AsnInfo, RangeKey, RangeRecord};
use rayon::prelude::*;
use serde::Serialize;
use std::net::IpAddr;
use std::path::Path;

/// A matched range together with its tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeMatch<'a> {
    /// First address of the matched range
    pub start: IpAddr,
    /// Last address of the matched range
    pub end: IpAddr,
    /// Tag of the matched range
    #[serde(flatten)]
    pub info: &'a AsnInfo,
}

impl<'a> RangeMatch<'a> {
    fn from_record<K: RangeKey>(record: &'a RangeRecord<K>) -> Self {
        Self {
            start: record.start.to_ip(),
            end: record.end.to_ip(),
            info: &record.info,
        }
    }
}

/// IP-to-ASN database with one index per address family
///
/// # Examples
///
/// ```no_run
/// use ipasn::AsnDatabase;
///
/// let db = AsnDatabase::open("ip2asn-v4.tsv.gz")?;
/// let info = db.lookup_str("1.1.1.1");
/// println!("{} {} {}", info.asn, info.country, info.org);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct AsnDatabase {
    v4: RangeIndex<u32>,
    v6: RangeIndex<u128>,
    stats: BuildStats,
}

impl AsnDatabase {
    /// Start building a database from rows
    pub fn builder() -> AsnDatabaseBuilder {
        AsnDatabaseBuilder::new()
    }

    /// Load a delimited range database file with default options
    ///
    /// The delimiter is chosen from the file extension and `.gz` files are
    /// decompressed. See [`loader::load_database`] for control over both.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_database(path, &LoadOptions::default())
    }

    /// Assemble a database from prebuilt indices
    pub fn from_parts(v4: RangeIndex<u32>, v6: RangeIndex<u128>, stats: BuildStats) -> Self {
        Self { v4, v6, stats }
    }

    /// IPv4 index
    pub fn ipv4(&self) -> &RangeIndex<u32> {
        &self.v4
    }

    /// IPv6 index
    pub fn ipv6(&self) -> &RangeIndex<u128> {
        &self.v6
    }

    /// Statistics from the build that produced this database
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Total number of ranges
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    /// True if neither family has any ranges
    pub fn is_empty(&self) -> bool {
        self.v4.is_empty() && self.v6.is_empty()
    }

    /// Range containing `ip`, if any
    pub fn find_ip(&self, ip: IpAddr) -> Option<RangeMatch<'_>> {
        match ip {
            IpAddr::V4(v4) => self.v4.find(u32::from(v4)).map(RangeMatch::from_record),
            IpAddr::V6(v6) => self.v6.find(u128::from(v6)).map(RangeMatch::from_record),
        }
    }

    /// Tag for `ip`, or the miss result
    pub fn lookup_ip(&self, ip: IpAddr) -> &AsnInfo {
        match ip {
            IpAddr::V4(v4) => self.v4.lookup(u32::from(v4)),
            IpAddr::V6(v6) => self.v6.lookup(u128::from(v6)),
        }
    }

    /// Tag for address text, or the miss result
    ///
    /// Surrounding whitespace is ignored. Text that is not an IP address is
    /// a miss, not an error.
    pub fn lookup_str(&self, text: &str) -> &AsnInfo {
        match text.trim().parse::<IpAddr>() {
            Ok(ip) => self.lookup_ip(ip),
            Err(_) => AsnInfo::not_found(),
        }
    }

    /// Look up many address strings in parallel
    ///
    /// Results are in input order. Runs on the current rayon thread pool.
    pub fn lookup_batch<S>(&self, queries: &[S]) -> Vec<&AsnInfo>
    where
        S: AsRef<str> + Sync,
    {
        queries
            .par_iter()
            .map(|query| self.lookup_str(query.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Asn, Org};

    fn sample() -> AsnDatabase {
        let mut builder = AsnDatabase::builder();
        let rows = [
            vec!["1.0.0.0", "1.0.0.255", "13335", "US", "CLOUDFLARENET"],
            vec!["0.0.0.0", "0.255.255.255", "0", "None", "Not routed"],
            vec!["2606:4700::", "2606:4700:ffff::", "13335", "US", "CLOUDFLARENET"],
        ];
        for row in rows {
            builder.add_row(row).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_lookup_by_family() {
        let db = sample();
        assert_eq!(db.len(), 3);
        assert_eq!(db.lookup_str("1.0.0.1").asn, Asn::Known("13335".into()));
        assert_eq!(
            db.lookup_str("2606:4700::1111").asn,
            Asn::Known("13335".into())
        );
        assert!(!db.lookup_str("2607::1").is_found());
    }

    #[test]
    fn test_no_cross_family_collision() {
        // ::1.0.0.1 has the same low 32 bits as 1.0.0.1
        let db = sample();
        assert!(!db.lookup_str("::1.0.0.1").is_found());
        assert!(!db.lookup_str("::ffff:1.0.0.1").is_found());
    }

    #[test]
    fn test_unparseable_query_is_a_miss() {
        let db = sample();
        for text in ["", "not-an-ip", "1.0.0", "1.0.0.256", "example.com"] {
            assert_eq!(db.lookup_str(text), AsnInfo::not_found(), "{:?}", text);
        }
        assert!(db.lookup_str("  1.0.0.7\n").is_found());
    }

    #[test]
    fn test_find_ip_reports_range() {
        let db = sample();
        let m = db.find_ip("1.0.0.42".parse().unwrap()).unwrap();
        assert_eq!(m.start.to_string(), "1.0.0.0");
        assert_eq!(m.end.to_string(), "1.0.0.255");
        assert_eq!(m.info.org, Org::Name("CLOUDFLARENET".into()));
        assert!(db.find_ip("9.9.9.9".parse().unwrap()).is_none());
    }

    #[test]
    fn test_lookup_batch_preserves_order() {
        let db = sample();
        let queries = vec!["1.0.0.1", "bogus", "0.1.2.3", "9.9.9.9"];
        let results = db.lookup_batch(&queries);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_found());
        assert!(!results[1].is_found());
        assert_eq!(results[2].org, Org::Name("Not routed".into()));
        assert_eq!(results[2].asn, Asn::Unknown);
        assert!(!results[3].is_found());
    }

    #[test]
    fn test_empty_database() {
        let db = AsnDatabase::default();
        assert!(db.is_empty());
        assert!(!db.lookup_str("1.1.1.1").is_found());
        assert!(!db.lookup_str("::1").is_found());
    }
}
