use anyhow::Result;
use ipasn::{AsnDatabase, RangeIndex, RangeKey};
use serde_json::json;

use crate::cli_utils::{format_number, DatabaseArgs};

fn overlap_lines<K: RangeKey>(index: &RangeIndex<K>, limit: usize) -> Vec<String> {
    index
        .overlapping_pairs()
        .into_iter()
        .take(limit)
        .map(|(earlier, later)| {
            format!(
                "{} - {} (AS {}) overlaps {} - {} (AS {})",
                later.start.to_ip(),
                later.end.to_ip(),
                later.info.asn,
                earlier.start.to_ip(),
                earlier.end.to_ip(),
                earlier.info.asn
            )
        })
        .collect()
}

fn coverage<K: RangeKey>(index: &RangeIndex<K>) -> Option<(String, String)> {
    let first = index.records().first()?;
    let last_end = index.records().iter().map(|r| r.end).max()?;
    Some((first.start.to_ip().to_string(), last_end.to_ip().to_string()))
}

pub fn cmd_inspect(database: DatabaseArgs, json: bool, overlaps: usize) -> Result<()> {
    let db: AsnDatabase = database.load()?;
    let stats = db.stats();

    let mut overlap_report = overlap_lines(db.ipv4(), overlaps);
    let remaining = overlaps.saturating_sub(overlap_report.len());
    overlap_report.extend(overlap_lines(db.ipv6(), remaining));

    if json {
        let output = json!({
            "database": database.path.display().to_string(),
            "ranges": db.len(),
            "ipv4_coverage": coverage(db.ipv4()),
            "ipv6_coverage": coverage(db.ipv6()),
            "stats": stats,
            "overlapping": overlap_report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Database: {}", database.path.display());
    println!();
    println!("Ranges:");
    println!("  Total:       {}", format_number(db.len()));
    println!("  IPv4:        {}", format_number(stats.ipv4_ranges));
    println!("  IPv6:        {}", format_number(stats.ipv6_ranges));
    if let Some((first, last)) = coverage(db.ipv4()) {
        println!("  IPv4 span:   {} - {}", first, last);
    }
    if let Some((first, last)) = coverage(db.ipv6()) {
        println!("  IPv6 span:   {} - {}", first, last);
    }
    println!();
    println!("Rows:");
    println!("  Read:        {}", format_number(stats.rows_read));
    println!("  Dropped:     {}", format_number(stats.dropped()));
    if stats.dropped() > 0 {
        println!("    Too few fields:   {}", stats.dropped_too_few_fields);
        println!("    Invalid address:  {}", stats.dropped_invalid_address);
        println!("    Mixed family:     {}", stats.dropped_mixed_family);
        println!("    Inverted range:   {}", stats.dropped_inverted_range);
        println!("    Undecodable:      {}", stats.dropped_undecodable);
    }
    println!();
    println!("Overlapping pairs: {}", format_number(stats.overlaps));
    for line in &overlap_report {
        println!("  {}", line);
    }

    Ok(())
}
