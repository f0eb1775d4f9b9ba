mod commands;
mod terminal;

use commands::{CommandLine, Commands, discover, ping, scan, trace};
use terminal::print;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    terminal::logging::init();

    match cli.command {
        Commands::Ping {
            hosts,
            count,
            timeout,
            interval,
        } => {
            print::header("ping");
            ping::run(hosts, count, timeout, interval).await
        }
        Commands::Scan {
            host,
            ports,
            timeout,
        } => {
            print::header("port scan");
            scan::run(host, &ports, timeout).await
        }
        Commands::Discover { timeout } => {
            print::header("discovery");
            discover::run(timeout).await
        }
        Commands::Trace { host, max_hops } => {
            print::header("traceroute");
            trace::run(&host, max_hops).await
        }
    }
}
