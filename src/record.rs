//! Range records and their ownership tags
//!
//! A [`RangeRecord`] is one inclusive `[start, end]` block of address space
//! tagged with an [`AsnInfo`]. The tag fields carry explicit markers instead
//! of empty strings so callers can tell "unknown" apart from real values:
//!
//! | Field     | Marker                | Rendered as  |
//! |-----------|-----------------------|--------------|
//! | ASN       | [`Asn::Unknown`]      | `N/A`        |
//! | Country   | [`Country::Unknown`]  | `N/A`        |
//! | Org       | [`Org::NotRouted`]    | `Not routed` |
//! | Org       | [`Org::NotFound`]     | `Not found`  |
//!
//! `NotRouted` comes from the database itself (a deliberately unassigned
//! range); `NotFound` is only ever produced by a lookup miss.

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Text rendered for unknown ASN and country values
pub const UNKNOWN_MARKER: &str = "N/A";
/// Text rendered for ranges the database marks as unassigned
pub const NOT_ROUTED_MARKER: &str = "Not routed";
/// Text rendered for lookups that matched no range
pub const NOT_FOUND_MARKER: &str = "Not found";

/// ASN value the database uses for "no ASN"
const NO_ASN_SENTINEL: &str = "0";
/// Country value the database uses for "no country"
const NULL_COUNTRY_SENTINEL: &str = "None";

/// Integer key type an index can be built over
///
/// Implemented for `u32` (IPv4) and `u128` (IPv6). Keeping the width in the
/// type means an IPv4 index can never be probed with an IPv6 key.
pub trait RangeKey: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Address family name for diagnostics
    const FAMILY: &'static str;

    /// Convert back to an address for display
    fn to_ip(self) -> IpAddr;
}

impl RangeKey for u32 {
    const FAMILY: &'static str = "IPv4";

    fn to_ip(self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::from(self))
    }
}

impl RangeKey for u128 {
    const FAMILY: &'static str = "IPv6";

    fn to_ip(self) -> IpAddr {
        IpAddr::V6(Ipv6Addr::from(self))
    }
}

/// Autonomous system number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Asn {
    /// ASN as it appears in the database
    Known(String),
    /// No ASN assigned, or a lookup miss
    Unknown,
}

impl Asn {
    /// Normalize a raw database field
    ///
    /// The `"0"` sentinel and empty fields become [`Asn::Unknown`].
    pub fn from_field(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == NO_ASN_SENTINEL {
            Asn::Unknown
        } else {
            Asn::Known(raw.to_string())
        }
    }

    /// Returns the ASN text, or `None` when unknown
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Asn::Known(asn) => Some(asn),
            Asn::Unknown => None,
        }
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asn::Known(asn) => f.write_str(asn),
            Asn::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

/// Country code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Country {
    /// ISO-style code as it appears in the database
    Code(String),
    /// Absent, empty or the `None` null marker
    Unknown,
}

impl Country {
    /// Normalize an optional raw database field
    pub fn from_field(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(code) if !code.is_empty() && code != NULL_COUNTRY_SENTINEL => {
                Country::Code(code.to_string())
            }
            _ => Country::Unknown,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Country::Code(code) => f.write_str(code),
            Country::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

/// Organization owning a range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Org {
    /// Organization name
    Name(String),
    /// The database lists no organization for this range
    NotRouted,
    /// Lookup miss; never stored in an index
    NotFound,
}

impl Org {
    /// Normalize the trailing organization fields of a row
    ///
    /// Databases do not quote organization names consistently, so a name may
    /// arrive split across several fields. They are joined with single spaces
    /// and trimmed. No fields (or only blank ones) means [`Org::NotRouted`].
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined = fields.into_iter().collect::<Vec<_>>().join(" ");
        let name = joined.trim();
        if name.is_empty() {
            Org::NotRouted
        } else {
            Org::Name(name.to_string())
        }
    }
}

impl fmt::Display for Org {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Org::Name(name) => f.write_str(name),
            Org::NotRouted => f.write_str(NOT_ROUTED_MARKER),
            Org::NotFound => f.write_str(NOT_FOUND_MARKER),
        }
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_display!(Asn, Country, Org);

/// Ownership tag returned by every lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AsnInfo {
    /// Autonomous system number
    pub asn: Asn,
    /// Country code
    pub country: Country,
    /// Organization
    pub org: Org,
}

/// Result of a lookup that matched no range
static NOT_FOUND: AsnInfo = AsnInfo {
    asn: Asn::Unknown,
    country: Country::Unknown,
    org: Org::NotFound,
};

impl AsnInfo {
    /// Create a tag from already-normalized parts
    pub fn new(asn: Asn, country: Country, org: Org) -> Self {
        Self { asn, country, org }
    }

    /// The shared miss result: unknown ASN, unknown country, `Not found`
    pub fn not_found() -> &'static AsnInfo {
        &NOT_FOUND
    }

    /// True unless this is the miss result
    pub fn is_found(&self) -> bool {
        self.org != Org::NotFound
    }
}

/// An inclusive block of address space with its ownership tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRecord<K: RangeKey> {
    /// First address in the range
    pub start: K,
    /// Last address in the range (inclusive)
    pub end: K,
    /// Ownership tag
    pub info: AsnInfo,
}

impl<K: RangeKey> RangeRecord<K> {
    /// Create a record; callers guarantee `start <= end`
    pub fn new(start: K, end: K, info: AsnInfo) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { start, end, info }
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.start <= key && key <= self.end
    }
}
