use anyhow::{Context, Result};
use clap::Args;
use ipasn::{file_reader, AsnDatabase, Delimiter, LoadOptions, OverlapPolicy};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Options shared by every command that loads a range database
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Range database (start,end,asn[,country[,org]]); .gz is decompressed
    #[arg(
        short = 'd',
        long = "database",
        value_name = "FILE",
        env = "IPASN_DATABASE",
        default_value = "ip2asn-v4.csv"
    )]
    pub path: PathBuf,

    /// Field delimiter: auto (from file extension), comma, or tab
    #[arg(long, default_value = "auto")]
    pub delimiter: String,

    /// Fail if the database contains overlapping ranges
    #[arg(long)]
    pub strict: bool,
}

impl DatabaseArgs {
    pub fn load_options(&self) -> Result<LoadOptions> {
        let mut options = LoadOptions::default();
        if self.delimiter != "auto" {
            let delimiter: Delimiter = self.delimiter.parse()?;
            options = options.with_delimiter(delimiter);
        }
        if self.strict {
            options = options.with_overlap_policy(OverlapPolicy::Reject);
        }
        Ok(options)
    }

    pub fn load(&self) -> Result<AsnDatabase> {
        let options = self.load_options()?;
        ipasn::load_database(&self.path, &options)
            .with_context(|| format!("Failed to load database: {}", self.path.display()))
    }
}

/// Configure env_logger; `-v` flags override RUST_LOG
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose > 0 {
        builder.filter_level(level);
    }
    builder.format_timestamp(None);
    // Only fails if a logger is already installed
    let _ = builder.try_init();
}

/// Parse a `--threads` value: None, "auto" or "0" mean all cores
pub fn parse_threads(arg: Option<&str>) -> Result<usize> {
    match arg {
        None | Some("auto") | Some("0") => Ok(0),
        Some(s) => s.parse::<usize>().with_context(|| {
            format!("Invalid thread count '{}', expected a number or 'auto'", s)
        }),
    }
}

/// Build a rayon pool; 0 threads lets rayon pick one per core
pub fn build_thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("ipasn-worker-{}", i))
        .build()
        .context("Failed to start worker threads")
}

/// Zero-copy line scanner using memchr for SIMD-accelerated scanning.
/// Skips blank lines and trims ASCII whitespace.
pub struct LineScanner<R: io::BufRead> {
    reader: R,
    partial: Vec<u8>,
    eof: bool,
}

impl<R: io::BufRead> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            partial: Vec::new(),
            eof: false,
        }
    }

    /// Read next non-blank line into `line_buf`.
    /// Returns Ok(true) if a line was read, Ok(false) on EOF.
    pub fn read_line(&mut self, line_buf: &mut Vec<u8>) -> io::Result<bool> {
        line_buf.clear();

        loop {
            if self.eof {
                let trimmed = self.partial.trim_ascii();
                let found = !trimmed.is_empty();
                if found {
                    line_buf.extend_from_slice(trimmed);
                }
                self.partial.clear();
                return Ok(found);
            }

            let buffer = self.reader.fill_buf()?;
            if buffer.is_empty() {
                self.eof = true;
                continue;
            }

            match memchr::memchr(b'\n', buffer) {
                Some(newline_pos) => {
                    if self.partial.is_empty() {
                        // Fast path: whole line in buffer
                        line_buf.extend_from_slice(buffer[..newline_pos].trim_ascii());
                    } else {
                        self.partial.extend_from_slice(&buffer[..newline_pos]);
                        line_buf.extend_from_slice(self.partial.trim_ascii());
                        self.partial.clear();
                    }
                    self.reader.consume(newline_pos + 1);
                    if !line_buf.is_empty() {
                        return Ok(true);
                    }
                }
                None => {
                    self.partial.extend_from_slice(buffer);
                    let consumed = buffer.len();
                    self.reader.consume(consumed);
                }
            }
        }
    }

    /// Read up to `max` lines as (lossy) strings. Empty result means EOF.
    pub fn read_batch(&mut self, max: usize) -> io::Result<Vec<String>> {
        let mut batch = Vec::with_capacity(max);
        let mut buf = Vec::new();
        while batch.len() < max && self.read_line(&mut buf)? {
            batch.push(String::from_utf8_lossy(&buf).into_owned());
        }
        Ok(batch)
    }
}

/// Output encoding for batch commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Header row plus comma-separated rows
    Csv,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("Unknown format: {}. Use 'csv' or 'json'", other),
        }
    }
}

/// A column: CSV header text and JSON key
pub type Column = (&'static str, &'static str);

enum Sink {
    Csv(csv::Writer<Box<dyn Write + Send>>),
    Json(Box<dyn Write + Send>),
}

/// Writes result rows as CSV or NDJSON
pub struct RowWriter {
    sink: Sink,
    columns: &'static [Column],
}

impl RowWriter {
    /// Create the output (`-` for stdout, `.gz` compressed) and write the header
    pub fn create(path: &Path, format: OutputFormat, columns: &'static [Column]) -> Result<Self> {
        let out = file_reader::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;

        let sink = match format {
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(out);
                writer
                    .write_record(columns.iter().map(|(header, _)| *header))
                    .context("Failed to write CSV header")?;
                Sink::Csv(writer)
            }
            OutputFormat::Json => Sink::Json(out),
        };

        Ok(Self { sink, columns })
    }

    pub fn write_row(&mut self, fields: &[&str]) -> Result<()> {
        debug_assert_eq!(fields.len(), self.columns.len());
        match &mut self.sink {
            Sink::Csv(writer) => writer.write_record(fields)?,
            Sink::Json(out) => {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(fields)
                    .map(|((_, key), value)| (key.to_string(), (*value).into()))
                    .collect();
                serde_json::to_writer(&mut *out, &object)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        match self.sink {
            Sink::Csv(mut writer) => writer.flush()?,
            Sink::Json(mut out) => out.flush()?,
        }
        Ok(())
    }
}

pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

pub fn format_qps(qps: f64) -> String {
    if qps >= 1_000_000.0 {
        format!("{:.2}M", qps / 1_000_000.0)
    } else if qps >= 1_000.0 {
        format!("{:.2}K", qps / 1_000.0)
    } else {
        format!("{:.2}", qps)
    }
}
