//! Buffered file access with transparent gzip handling
//!
//! Range databases are commonly distributed gzip-compressed
//! (`ip2asn-v4.tsv.gz`), and batch inputs are often piped. [`open`] and
//! [`create`] hide both concerns:
//!
//! - a path of `-` means stdin (for [`open`]) or stdout (for [`create`])
//! - a `.gz` extension (any case) means gzip
//!
//! ```rust,no_run
//! use ipasn::file_reader;
//! use std::io::BufRead;
//!
//! let reader = file_reader::open("ips.txt.gz")?;
//! for line in reader.lines() {
//!     println!("{}", line?);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, stdin, stdout, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Buffer size for reading and writing (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// Path that stands for stdin or stdout
pub const STDIO_PATH: &str = "-";

/// True if `path` is the stdin/stdout placeholder
pub fn is_stdio<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().to_str() == Some(STDIO_PATH)
}

/// True if the path ends in `.gz` (case-insensitive)
pub fn is_gzip<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Extension describing the content, looking through a `.gz` suffix
///
/// `ip2asn-v4.tsv.gz` → `tsv`, `ranges.csv` → `csv`.
pub fn content_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    let inner = if is_gzip(path) {
        Path::new(path.file_stem()?)
    } else {
        path
    };
    inner
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Open a file for buffered reading, decompressing `.gz` files
///
/// `-` reads stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. Invalid gzip data surfaces
/// as an error on the first read.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();

    if is_stdio(path) {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, stdin())));
    }

    let file = File::open(path)?;
    Ok(from_file(file, is_gzip(path)))
}

/// Wrap an open file, with an explicit gzip flag
pub fn from_file(file: File, is_gzip: bool) -> Box<dyn BufRead + Send> {
    if is_gzip {
        Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            MultiGzDecoder::new(file),
        ))
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    }
}

/// Create a file for buffered writing, compressing `.gz` files
///
/// `-` writes stdout. Gzip output is finalized when the writer is dropped.
pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Write + Send>> {
    let path = path.as_ref();

    if is_stdio(path) {
        return Ok(Box::new(BufWriter::with_capacity(BUFFER_SIZE, stdout())));
    }

    let file = File::create(path)?;
    if is_gzip(path) {
        Ok(Box::new(GzEncoder::new(
            BufWriter::with_capacity(BUFFER_SIZE, file),
            Compression::default(),
        )))
    } else {
        Ok(Box::new(BufWriter::with_capacity(BUFFER_SIZE, file)))
    }
}
