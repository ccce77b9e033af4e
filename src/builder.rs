//! Database builder
//!
//! Turns raw database rows into an [`AsnDatabase`]. Each row is validated on
//! its own; a bad row is counted and skipped, never fatal:
//!
//! ```text
//! start, end, asn [, country [, org ...]]
//! ```
//!
//! - fewer than three fields → [`RowError::TooFewFields`]
//! - start or end not an IP address → [`RowError::InvalidAddress`]
//! - start and end of different families → [`RowError::MixedFamily`]
//! - end before start → [`RowError::InvertedRange`]
//!
//! Accepted rows are normalized (see [`crate::record`]) and filed into the
//! IPv4 or IPv6 index by family.

use crate::database::AsnDatabase;
use crate::error::{AsnError, Result};
use crate::index::RangeIndex;
use crate::record::{Asn, AsnInfo, Country, Org, RangeKey, RangeRecord};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// Minimum number of fields in a usable row
pub const MIN_FIELDS: usize = 3;

/// How many overlapping pairs to log individually before summarizing
const MAX_LOGGED_OVERLAPS: usize = 10;

/// Why a row was left out of the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// Row has fewer than [`MIN_FIELDS`] fields (carries the count)
    TooFewFields(usize),
    /// Start or end is not an IP address (carries the offending text)
    InvalidAddress(String),
    /// Start and end are of different address families
    MixedFamily,
    /// End address sorts before start address
    InvertedRange,
    /// The row could not be decoded at all (e.g. invalid UTF-8)
    Undecodable(String),
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::TooFewFields(n) => {
                write!(f, "expected at least {} fields, found {}", MIN_FIELDS, n)
            }
            RowError::InvalidAddress(text) => write!(f, "invalid IP address '{}'", text),
            RowError::MixedFamily => write!(f, "range mixes IPv4 and IPv6 bounds"),
            RowError::InvertedRange => write!(f, "range end precedes start"),
            RowError::Undecodable(msg) => write!(f, "undecodable row: {}", msg),
        }
    }
}

impl std::error::Error for RowError {}

/// What to do when ranges overlap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Keep overlapping ranges; lookups prefer the later-starting range
    #[default]
    Allow,
    /// Fail the build
    Reject,
}

/// Counters collected while building
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Rows offered to the builder
    pub rows_read: usize,
    /// IPv4 ranges accepted
    pub ipv4_ranges: usize,
    /// IPv6 ranges accepted
    pub ipv6_ranges: usize,
    /// Rows dropped for having too few fields
    pub dropped_too_few_fields: usize,
    /// Rows dropped for an unparseable address
    pub dropped_invalid_address: usize,
    /// Rows dropped for mixing address families
    pub dropped_mixed_family: usize,
    /// Rows dropped for end < start
    pub dropped_inverted_range: usize,
    /// Rows that could not be decoded
    pub dropped_undecodable: usize,
    /// Overlapping range pairs found after sorting
    pub overlaps: usize,
}

impl BuildStats {
    /// Total ranges accepted across both families
    pub fn accepted(&self) -> usize {
        self.ipv4_ranges + self.ipv6_ranges
    }

    /// Total rows dropped for any reason
    pub fn dropped(&self) -> usize {
        self.dropped_too_few_fields
            + self.dropped_invalid_address
            + self.dropped_mixed_family
            + self.dropped_inverted_range
            + self.dropped_undecodable
    }

    fn record_drop(&mut self, reason: &RowError) {
        match reason {
            RowError::TooFewFields(_) => self.dropped_too_few_fields += 1,
            RowError::InvalidAddress(_) => self.dropped_invalid_address += 1,
            RowError::MixedFamily => self.dropped_mixed_family += 1,
            RowError::InvertedRange => self.dropped_inverted_range += 1,
            RowError::Undecodable(_) => self.dropped_undecodable += 1,
        }
    }
}

/// Collects rows and builds an [`AsnDatabase`]
///
/// # Example
/// ```rust
/// use ipasn::AsnDatabaseBuilder;
///
/// let mut builder = AsnDatabaseBuilder::new();
/// builder.add_row(["1.0.0.0", "1.0.0.255", "13335", "US", "CLOUDFLARENET"]).unwrap();
/// builder.add_row(["1.0.1.0", "1.0.3.255", "0", "None"]).unwrap();
/// assert!(builder.add_row(["garbage"]).is_err());
///
/// let db = builder.build()?;
/// assert_eq!(db.len(), 2);
/// assert_eq!(db.stats().dropped(), 1);
///
/// let hit = db.lookup_str("1.0.0.1");
/// assert_eq!(hit.asn.to_string(), "13335");
/// assert_eq!(db.lookup_str("1.0.2.9").org.to_string(), "Not routed");
/// assert_eq!(db.lookup_str("9.9.9.9").org.to_string(), "Not found");
/// # Ok::<(), ipasn::AsnError>(())
/// ```
#[derive(Debug, Default)]
pub struct AsnDatabaseBuilder {
    v4: Vec<RangeRecord<u32>>,
    v6: Vec<RangeRecord<u128>>,
    stats: BuildStats,
    overlap_policy: OverlapPolicy,
}

impl AsnDatabaseBuilder {
    /// Create an empty builder that allows overlapping ranges
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlap policy
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Statistics so far
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Add one raw row
    ///
    /// On error the row is counted as dropped and the reason returned; the
    /// builder stays usable.
    pub fn add_row<'a, I>(&mut self, fields: I) -> std::result::Result<(), RowError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.stats.rows_read += 1;
        let fields: Vec<&str> = fields.into_iter().collect();
        let result =
            parse_row(&fields).and_then(|(start, end, info)| self.insert(start, end, info));
        if let Err(ref reason) = result {
            self.stats.record_drop(reason);
        }
        result
    }

    /// Add an already-parsed range
    pub fn add_range(
        &mut self,
        start: IpAddr,
        end: IpAddr,
        info: AsnInfo,
    ) -> std::result::Result<(), RowError> {
        self.stats.rows_read += 1;
        let result = self.insert(start, end, info);
        if let Err(ref reason) = result {
            self.stats.record_drop(reason);
        }
        result
    }

    /// Count a row that could not be decoded by the caller
    pub fn skip_row(&mut self, reason: RowError) {
        self.stats.rows_read += 1;
        self.stats.record_drop(&reason);
    }

    fn insert(
        &mut self,
        start: IpAddr,
        end: IpAddr,
        info: AsnInfo,
    ) -> std::result::Result<(), RowError> {
        match (start, end) {
            (IpAddr::V4(start), IpAddr::V4(end)) => {
                let (start, end) = (u32::from(start), u32::from(end));
                if end < start {
                    return Err(RowError::InvertedRange);
                }
                self.v4.push(RangeRecord::new(start, end, info));
                self.stats.ipv4_ranges += 1;
            }
            (IpAddr::V6(start), IpAddr::V6(end)) => {
                let (start, end) = (u128::from(start), u128::from(end));
                if end < start {
                    return Err(RowError::InvertedRange);
                }
                self.v6.push(RangeRecord::new(start, end, info));
                self.stats.ipv6_ranges += 1;
            }
            _ => return Err(RowError::MixedFamily),
        }
        Ok(())
    }

    /// Sort, check for overlaps and produce the database
    pub fn build(self) -> Result<AsnDatabase> {
        let Self {
            v4,
            v6,
            mut stats,
            overlap_policy,
        } = self;

        let v4 = RangeIndex::build(v4);
        let v6 = RangeIndex::build(v6);
        stats.overlaps = report_overlaps(&v4) + report_overlaps(&v6);

        let dropped = stats.dropped();
        if dropped > 0 {
            warn!(
                "Dropped {} malformed row(s) of {} (fields: {}, address: {}, family: {}, inverted: {}, undecodable: {})",
                dropped,
                stats.rows_read,
                stats.dropped_too_few_fields,
                stats.dropped_invalid_address,
                stats.dropped_mixed_family,
                stats.dropped_inverted_range,
                stats.dropped_undecodable
            );
        }

        if stats.overlaps > 0 {
            match overlap_policy {
                OverlapPolicy::Allow => warn!(
                    "{} overlapping range pair(s); lookups prefer the later-starting range",
                    stats.overlaps
                ),
                OverlapPolicy::Reject => {
                    return Err(AsnError::Validation(format!(
                        "{} overlapping range pair(s) in database",
                        stats.overlaps
                    )))
                }
            }
        }

        info!(
            "Built ASN database: {} IPv4 and {} IPv6 ranges",
            stats.ipv4_ranges, stats.ipv6_ranges
        );

        Ok(AsnDatabase::from_parts(v4, v6, stats))
    }
}

/// Validate and normalize one row
fn parse_row(fields: &[&str]) -> std::result::Result<(IpAddr, IpAddr, AsnInfo), RowError> {
    if fields.len() < MIN_FIELDS {
        return Err(RowError::TooFewFields(fields.len()));
    }

    let start = parse_addr(fields[0])?;
    let end = parse_addr(fields[1])?;

    let info = AsnInfo::new(
        Asn::from_field(fields[2]),
        Country::from_field(fields.get(3).copied()),
        Org::from_fields(fields.iter().skip(4).copied()),
    );

    Ok((start, end, info))
}

fn parse_addr(field: &str) -> std::result::Result<IpAddr, RowError> {
    let text = field.trim();
    text.parse()
        .map_err(|_| RowError::InvalidAddress(text.to_string()))
}

/// Log overlapping pairs and return how many there are
fn report_overlaps<K: RangeKey>(index: &RangeIndex<K>) -> usize {
    let pairs = index.overlapping_pairs();
    for (earlier, later) in pairs.iter().take(MAX_LOGGED_OVERLAPS) {
        debug!(
            "{} range {}-{} overlaps {}-{}",
            K::FAMILY,
            later.start.to_ip(),
            later.end.to_ip(),
            earlier.start.to_ip(),
            earlier.end.to_ip()
        );
    }
    if pairs.len() > MAX_LOGGED_OVERLAPS {
        debug!(
            "... and {} more {} overlap(s)",
            pairs.len() - MAX_LOGGED_OVERLAPS,
            K::FAMILY
        );
    }
    pairs.len()
}
