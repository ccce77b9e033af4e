use anyhow::Result;
use ipasn::AsnInfo;
use serde_json::json;
use std::net::IpAddr;

use crate::cli_utils::DatabaseArgs;

pub fn cmd_query(database: DatabaseArgs, address: String, quiet: bool) -> Result<()> {
    let db = database.load()?;

    // Unparseable text is a miss, same as in batch mode
    let found = match address.trim().parse::<IpAddr>() {
        Ok(ip) => db.find_ip(ip),
        Err(_) => None,
    };

    if quiet {
        // Quiet mode: no output, just exit code
        std::process::exit(if found.is_some() { 0 } else { 1 });
    }

    let mut result = match &found {
        Some(m) => serde_json::to_value(m)?,
        None => serde_json::to_value(AsnInfo::not_found())?,
    };
    if let serde_json::Value::Object(ref mut map) = result {
        map.insert("ip".to_string(), json!(address.trim()));
    }

    println!("{}", serde_json::to_string_pretty(&result)?);

    std::process::exit(if found.is_some() { 0 } else { 1 });
}
