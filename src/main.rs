#![warn(rust_2018_idioms)]

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mc_status_ping::{StatusPinger, DEFAULT_PORT, DEFAULT_PROTOCOL_VERSION};

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the status a Minecraft server advertises", long_about = None)]
struct Args {
    #[arg(help = "Server to query, as `host` or `host:port`")]
    address: String,

    #[arg(short, long, help = "Port, overrides one given in the address [default: 25565]")]
    port: Option<u16>,

    #[arg(short, long = "timeout-ms", default_value_t = 5000)]
    timeout_ms: u64,

    #[arg(long, default_value_t = DEFAULT_PROTOCOL_VERSION)]
    protocol_version: u32,

    #[arg(long, default_value_t = false, help = "Only print icon, description and players")]
    summary: bool,

    #[arg(long, default_value_t = false, help = "Print JSON on a single line")]
    compact: bool,
}

fn unbracket(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host)
}

/// Splits `host:port`. Anything that doesn't end in a valid port, such as a bare IPv6
/// address, is taken as the host alone.
fn split_address(address: &str) -> (&str, Option<u16>) {
    let bracketed = address.starts_with('[');
    match address.rsplit_once(':') {
        Some((host, port)) if bracketed || !host.contains(':') => match port.parse() {
            Ok(port) => (unbracket(host), Some(port)),
            Err(_) => (unbracket(address), None),
        },
        _ => (unbracket(address), None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (host, address_port) = split_address(&args.address);
    let port = args.port.or(address_port).unwrap_or(DEFAULT_PORT);

    info!("querying {host}:{port}");
    let pinger = StatusPinger::new(host)
        .port(port)
        .timeout(Duration::from_millis(args.timeout_ms))
        .protocol_version(args.protocol_version);

    let status = match pinger.query().await {
        Ok(status) => status,
        Err(err) => {
            error!(kind = ?err.kind(), "query to {host}:{port} failed: {err}");
            return Err(err).with_context(|| format!("could not query {host}:{port}"));
        }
    };
    info!("{host}:{port} answered");

    let output = if args.summary {
        serde_json::to_value(status.summary())?
    } else {
        status.into_value()
    };
    if args.compact {
        println!("{output}");
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
