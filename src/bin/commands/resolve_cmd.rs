use anyhow::{Context, Result};
use ipasn::file_reader;
use ipasn::record::UNKNOWN_MARKER;
use rayon::prelude::*;
use std::net::{IpAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Instant;

use super::lookup_cmd::BATCH_LINES;
use crate::cli_utils::{
    build_thread_pool, format_number, parse_threads, Column, DatabaseArgs, LineScanner,
    OutputFormat, RowWriter,
};

const COLUMNS: &[Column] = &[
    ("FQDN", "fqdn"),
    ("Resolved IP", "ip"),
    ("ASN", "asn"),
    ("Country", "country"),
    ("Org", "org"),
];

const UNRESOLVED: &str = "Unresolved";

/// Resolve a host name through the system resolver, preferring IPv4
///
/// IP literals are returned as-is.
pub fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }

    let addrs: Vec<IpAddr> = match (host, 0).to_socket_addrs() {
        Ok(addrs) => addrs.map(|sa| sa.ip()).collect(),
        Err(e) => {
            log::debug!("Could not resolve {}: {}", host, e);
            return None;
        }
    };

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

pub fn cmd_resolve(
    database: DatabaseArgs,
    input: PathBuf,
    output: PathBuf,
    format: String,
    threads_arg: Option<String>,
    show_stats: bool,
) -> Result<()> {
    let format = OutputFormat::parse(&format)?;
    let pool = build_thread_pool(parse_threads(threads_arg.as_deref())?)?;
    let db = database.load()?;

    let reader = file_reader::open(&input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let mut scanner = LineScanner::new(reader);
    let mut writer = RowWriter::create(&output, format, COLUMNS)?;

    let start = Instant::now();
    let (mut total, mut unresolved, mut found) = (0usize, 0usize, 0usize);

    loop {
        let hosts = scanner
            .read_batch(BATCH_LINES)
            .with_context(|| format!("Failed to read input: {}", input.display()))?;
        if hosts.is_empty() {
            break;
        }

        // Resolution blocks on the network, so it is spread across the pool
        let resolved: Vec<Option<IpAddr>> =
            pool.install(|| hosts.par_iter().map(|h| resolve_host(h)).collect());

        for (host, ip) in hosts.iter().zip(resolved) {
            total += 1;
            match ip {
                Some(ip) => {
                    let info = db.lookup_ip(ip);
                    if info.is_found() {
                        found += 1;
                    }
                    let ip = ip.to_string();
                    let asn = info.asn.to_string();
                    let country = info.country.to_string();
                    let org = info.org.to_string();
                    writer.write_row(&[
                        host.as_str(),
                        ip.as_str(),
                        asn.as_str(),
                        country.as_str(),
                        org.as_str(),
                    ])?;
                }
                None => {
                    unresolved += 1;
                    writer.write_row(&[
                        host.as_str(),
                        UNRESOLVED,
                        UNKNOWN_MARKER,
                        UNKNOWN_MARKER,
                        UNKNOWN_MARKER,
                    ])?;
                }
            }
        }
    }

    writer
        .finish()
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    log::info!(
        "Resolved {} of {} host names ({} matched a range)",
        total - unresolved,
        total,
        found
    );

    if show_stats {
        eprintln!("[INFO] Host names:  {}", format_number(total));
        eprintln!("[INFO] Unresolved:  {}", format_number(unresolved));
        eprintln!("[INFO] Found:       {}", format_number(found));
        eprintln!(
            "[INFO] Elapsed:     {:.2}s",
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
