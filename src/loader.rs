//! Delimited range database loader
//!
//! Reads range databases such as the iptoasn.com `ip2asn` files:
//!
//! ```text
//! 1.0.0.0	1.0.0.255	13335	US	CLOUDFLARENET
//! 1.0.1.0	1.0.3.255	0	None	Not routed
//! ```
//!
//! Rows have no header and may vary in width. Lines starting with `#` are
//! comments. Comma-separated files honor CSV quoting; tab-separated files
//! are read verbatim since organization names may contain stray quotes.
//!
//! Malformed rows are counted in [`BuildStats`](crate::BuildStats) and
//! skipped. Only an unreadable source is an error.

use crate::builder::{AsnDatabaseBuilder, OverlapPolicy, RowError};
use crate::database::AsnDatabase;
use crate::error::{AsnError, Result};
use crate::file_reader;
use log::{debug, info};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// Field separator of a range database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `,` with CSV quoting
    Comma,
    /// `\t`, no quoting
    Tab,
}

impl Delimiter {
    /// Guess the delimiter from a file name
    ///
    /// `.tsv` and `.tab` (optionally followed by `.gz`) are tab-separated;
    /// everything else, including stdin, is comma-separated.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        match file_reader::content_extension(path).as_deref() {
            Some("tsv") | Some("tab") => Delimiter::Tab,
            _ => Delimiter::Comma,
        }
    }

    fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

impl FromStr for Delimiter {
    type Err = AsnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "csv" | "," => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\t" => Ok(Delimiter::Tab),
            other => Err(AsnError::Other(format!(
                "Unknown delimiter: {}. Use 'comma' or 'tab'",
                other
            ))),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => f.write_str("comma"),
            Delimiter::Tab => f.write_str("tab"),
        }
    }
}

/// Options for loading a range database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field separator; `None` picks one from the file name
    pub delimiter: Option<Delimiter>,
    /// Overlap handling passed to the builder
    pub overlap_policy: OverlapPolicy,
}

impl LoadOptions {
    /// Force a delimiter
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the overlap policy
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }
}

/// Load a range database file
///
/// `.gz` files are decompressed and `-` reads stdin.
pub fn load_database<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<AsnDatabase> {
    let path = path.as_ref();
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| Delimiter::for_path(path));

    debug!(
        "Loading range database {} ({}-separated)",
        path.display(),
        delimiter
    );
    let started = Instant::now();

    let reader = file_reader::open(path).map_err(|e| {
        AsnError::Io(format!("Failed to open database {}: {}", path.display(), e))
    })?;
    let db = load_from_reader(reader, delimiter, options.overlap_policy)?;

    info!(
        "Loaded {} ranges from {} in {:.2}s",
        db.len(),
        path.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(db)
}

/// Load a range database from any reader
pub fn load_from_reader<R: Read>(
    reader: R,
    delimiter: Delimiter,
    overlap_policy: OverlapPolicy,
) -> Result<AsnDatabase> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.byte())
        .quoting(delimiter == Delimiter::Comma)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut builder = AsnDatabaseBuilder::new().with_overlap_policy(overlap_policy);

    for result in csv_reader.records() {
        match result {
            Ok(record) => {
                if let Err(reason) = builder.add_row(record.iter()) {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    debug!("Skipping database line {}: {}", line, reason);
                }
            }
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!("Skipping undecodable database row: {}", err);
                builder.skip_row(RowError::Undecodable(err.to_string()));
            }
        }
    }

    builder.build()
}
