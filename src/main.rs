use anyhow::{bail, Context, Result};
use peer_guard::api::client::Aria2Client;
use peer_guard::core::config::Config;
use peer_guard::core::tracing_init::init_tracing;
use peer_guard::scan::orchestrator::Scanner;
use peer_guard::security::ipset::IpsetBlocklist;
use std::env;
use std::path::PathBuf;
use tracing::{error, info};

const USAGE: &str = "Usage: peer-guard [--dry-run] [CONFIG_PATH]";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config_path: PathBuf,
    force_dry_run: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut config_path = None;
    let mut force_dry_run = false;

    for arg in args {
        match arg.as_str() {
            "--dry-run" => force_dry_run = true,
            flag if flag.starts_with("--") => bail!("Unknown option '{}'\n{}", flag, USAGE),
            path => {
                if config_path.is_some() {
                    bail!("Unexpected extra argument '{}'\n{}", path, USAGE);
                }
                config_path = Some(PathBuf::from(path));
            }
        }
    }

    Ok(Args {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("config.toml")),
        force_dry_run,
    })
}

fn main() -> Result<()> {
    let Args {
        config_path,
        force_dry_run,
    } = parse_args(env::args().skip(1))?;

    // Load and validate configuration
    let mut config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            Copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    if force_dry_run {
        config.blocking.dry_run = true;
    }

    init_tracing(&config.logging);

    // One scan, one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(run(config, config_path))
}

async fn run(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        endpoint = %config.rpc.endpoint,
        min_download_speed = config.detection.min_download_speed,
        score_ban = config.detection.score_ban,
        ban_timeout = config.blocking.ban_timeout,
        ipset = %config.blocking.ipset_name,
        dry_run = config.blocking.dry_run,
        "peer-guard starting"
    );

    let client = Aria2Client::from_config(&config.rpc)
        .context("Failed to create RPC client")?;

    let blocklist = IpsetBlocklist::new(config.blocking.ipset_name.clone());

    if config.blocking.create_set && !config.blocking.dry_run {
        blocklist
            .ensure_set(config.blocking.ban_timeout)
            .await
            .context(format!("Failed to create ipset '{}'", blocklist.set_name()))?;
    }

    let scanner = Scanner::from_config(client, blocklist, &config);

    let report = match scanner.run_scan().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Failed to list active transfers, scan aborted");
            return Err(e).context("Failed to list active transfers");
        }
    };

    println!("{}", report.render());

    Ok(())
}
