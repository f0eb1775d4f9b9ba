pub mod discover;
pub mod ping;
pub mod scan;
pub mod trace;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "netprobe")]
#[command(about = "Network diagnostics probe toolkit.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ping one or more hosts
    #[command(alias = "p")]
    Ping {
        /// Hosts to probe (names or addresses)
        #[arg(required = true)]
        hosts: Vec<String>,
        /// Echo requests per host
        #[arg(short, long, default_value_t = 3)]
        count: u32,
        /// Per-echo timeout in seconds
        #[arg(short, long, default_value_t = 1)]
        timeout: u64,
        /// Pause between echoes in seconds
        #[arg(short, long, default_value_t = 1)]
        interval: u64,
    },
    /// Scan TCP ports on a host
    #[command(alias = "s")]
    Scan {
        host: String,
        /// Ports to probe, e.g. "22,80,8000-8100"
        #[arg(short, long, default_value = "1-1024")]
        ports: String,
        /// Per-connection timeout in seconds
        #[arg(short, long, default_value_t = 1)]
        timeout: u64,
    },
    /// Discover devices on the local subnet
    #[command(alias = "d")]
    Discover {
        /// Per-address timeout in milliseconds
        #[arg(short, long, default_value_t = 500)]
        timeout: u64,
    },
    /// Trace the route to a host
    #[command(alias = "t")]
    Trace {
        host: String,
        /// TTL budget for the walk
        #[arg(short = 'm', long, default_value_t = 30)]
        max_hops: u8,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
