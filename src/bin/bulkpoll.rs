//! bulkpoll: poll a fixed OID set from an SNMP agent and print each sample.

use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use snmp_bulkpoll::{Oid, PollConfig, SampleError, UdpPoller, VarBind};
use tracing_subscriber::EnvFilter;

/// Adaptive SNMP bulk poller.
///
/// Polls the given OIDs on an interval and prints one line per sample.
/// When the agent reports tooBig, requests are split automatically.
#[derive(Debug, Parser)]
#[command(name = "bulkpoll", version, about)]
struct Args {
    /// Target agent: host or host:port (port defaults to 161).
    target: String,

    /// OIDs to poll, dotted notation.
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,

    /// Community string.
    #[arg(short, long, default_value = "public")]
    community: String,

    /// SNMP version: "1" or "2c" (unrecognized values fall back to 1).
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    snmp_version: String,

    /// Seconds between poll cycles.
    #[arg(short, long, default_value_t = 60)]
    interval: u64,

    /// Initial OIDs per request (default: all in one request).
    #[arg(short, long)]
    split: Option<usize>,

    /// Receive timeout in seconds.
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// Retries per request.
    #[arg(short, long, default_value_t = 3)]
    retries: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let oids: Vec<Oid> = match args.oids.iter().map(|s| Oid::parse(s)).collect() {
        Ok(oids) => oids,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut builder = PollConfig::builder(&args.target)
        .version_str(&args.snmp_version)
        .community(args.community.into_bytes())
        .interval(Duration::from_secs(args.interval))
        .timeout(Duration::from_secs(args.timeout))
        .retries(args.retries)
        .oids(oids);
    if let Some(split) = args.split {
        builder = builder.split(split);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let print_sample = |vb: VarBind, at: SystemTime| {
        let unix = at
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        println!("{} {}", unix, vb);
        Ok::<(), SampleError>(())
    };

    let poller = match UdpPoller::connect(config, print_sample).await {
        Ok(poller) => poller,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = poller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    poller.run().await;
    ExitCode::SUCCESS
}
