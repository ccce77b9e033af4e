mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cli_utils::DatabaseArgs;
use commands::{cmd_inspect, cmd_lookup, cmd_query, cmd_resolve};

#[derive(Parser)]
#[command(name = "ipasn")]
#[command(
    about = "Offline IP address to ASN, country and organization lookup",
    long_about = "ipasn - Offline IP address to ASN, country and organization lookup\n\n\
    Loads a static range database (start,end,asn,country,org rows such as the\n\
    iptoasn.com ip2asn dumps) and answers lookups with a binary search over the\n\
    sorted ranges. Addresses that match no range, or are not addresses at all,\n\
    are reported as N/A / Not found rather than failing the job.\n\n\
    Examples:\n\
      ipasn lookup ips.txt -o results.csv -d ip2asn-v4.tsv.gz\n\
      ipasn resolve hosts.txt -o hosts.csv -d ip2asn-v4.csv\n\
      ipasn query 1.1.1.1 -d ip2asn-v4.tsv\n\
      ipasn inspect -d ip2asn-v4.tsv --overlaps 20"
)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a file of IP addresses (one per line)
    Lookup {
        /// File of IP addresses, or "-" for stdin (.gz is decompressed)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file, or "-" for stdout (.gz is compressed)
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        output: PathBuf,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Output format: csv (default) or json (NDJSON)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Number of worker threads (default: auto-detect, use 1 for sequential)
        #[arg(short = 'j', long)]
        threads: Option<String>,

        /// Show lookup statistics on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Resolve a file of host names and look up their addresses
    Resolve {
        /// File of host names, or "-" for stdin (.gz is decompressed)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file, or "-" for stdout (.gz is compressed)
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        output: PathBuf,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Output format: csv (default) or json (NDJSON)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Number of resolver threads (default: auto-detect)
        #[arg(short = 'j', long)]
        threads: Option<String>,

        /// Show resolution statistics on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Look up a single address
    Query {
        /// IP address to look up
        #[arg(value_name = "ADDRESS")]
        address: String,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Quiet mode - no output, only exit code (0 = found, 1 = not found)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Load a database and report its contents and data quality
    Inspect {
        #[command(flatten)]
        database: DatabaseArgs,

        /// Output report as JSON
        #[arg(short, long)]
        json: bool,

        /// List up to this many overlapping range pairs
        #[arg(long, value_name = "N", default_value = "0")]
        overlaps: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli_utils::init_logging(cli.verbose);

    match cli.command {
        Commands::Lookup {
            input,
            output,
            database,
            format,
            threads,
            stats,
        } => cmd_lookup(database, input, output, format, threads, stats),
        Commands::Resolve {
            input,
            output,
            database,
            format,
            threads,
            stats,
        } => cmd_resolve(database, input, output, format, threads, stats),
        Commands::Query {
            address,
            database,
            quiet,
        } => cmd_query(database, address, quiet),
        Commands::Inspect {
            database,
            json,
            overlaps,
        } => cmd_inspect(database, json, overlaps),
    }
}
