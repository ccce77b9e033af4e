use anyhow::{Context, Result};
use ipasn::file_reader;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli_utils::{
    build_thread_pool, format_number, format_qps, parse_threads, Column, DatabaseArgs,
    LineScanner, OutputFormat, RowWriter,
};

/// Lines handed to the worker pool at a time
pub const BATCH_LINES: usize = 8192;

const COLUMNS: &[Column] = &[
    ("IP", "ip"),
    ("ASN", "asn"),
    ("Country", "country"),
    ("Organization", "org"),
];

#[derive(Debug, Default)]
struct LookupStats {
    lines: usize,
    found: usize,
    not_found: usize,
    invalid: usize,
}

pub fn cmd_lookup(
    database: DatabaseArgs,
    input: PathBuf,
    output: PathBuf,
    format: String,
    threads_arg: Option<String>,
    show_stats: bool,
) -> Result<()> {
    let format = OutputFormat::parse(&format)?;
    let pool = build_thread_pool(parse_threads(threads_arg.as_deref())?)?;

    let load_start = Instant::now();
    let db = database.load()?;
    if show_stats {
        eprintln!(
            "[INFO] Loaded {} ranges in {:.2}s ({} rows dropped)",
            format_number(db.len()),
            load_start.elapsed().as_secs_f64(),
            format_number(db.stats().dropped())
        );
    }

    let reader = file_reader::open(&input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let mut scanner = LineScanner::new(reader);
    let mut writer = RowWriter::create(&output, format, COLUMNS)?;

    let mut stats = LookupStats::default();
    let lookup_start = Instant::now();

    loop {
        let batch = scanner
            .read_batch(BATCH_LINES)
            .with_context(|| format!("Failed to read input: {}", input.display()))?;
        if batch.is_empty() {
            break;
        }

        let results = pool.install(|| db.lookup_batch(&batch));

        for (line, info) in batch.iter().zip(results) {
            stats.lines += 1;
            if info.is_found() {
                stats.found += 1;
            } else if line.parse::<IpAddr>().is_err() {
                stats.invalid += 1;
            } else {
                stats.not_found += 1;
            }

            let asn = info.asn.to_string();
            let country = info.country.to_string();
            let org = info.org.to_string();
            writer.write_row(&[line.as_str(), asn.as_str(), country.as_str(), org.as_str()])?;
        }
    }

    writer
        .finish()
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    log::info!(
        "Looked up {} addresses: {} found, {} not found, {} invalid",
        stats.lines,
        stats.found,
        stats.not_found,
        stats.invalid
    );

    if show_stats {
        let elapsed = lookup_start.elapsed().as_secs_f64();
        let qps = if elapsed > 0.0 {
            stats.lines as f64 / elapsed
        } else {
            0.0
        };
        eprintln!("[INFO] Lines processed: {}", format_number(stats.lines));
        eprintln!("[INFO] Found:           {}", format_number(stats.found));
        eprintln!("[INFO] Not found:       {}", format_number(stats.not_found));
        eprintln!("[INFO] Invalid:         {}", format_number(stats.invalid));
        eprintln!("[INFO] Throughput:      {} lookups/sec", format_qps(qps));
    }

    Ok(())
}
