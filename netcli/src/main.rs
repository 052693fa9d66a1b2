//! `netcli` binary: serves the device tools over stdio.
//!
//! Connection settings come from flags or `NETCLI_*` environment variables,
//! optionally loaded from a `.env` file. Logs go to stderr; stdout carries
//! only MCP messages.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use netcli::driver::DeviceClient;
use netcli::tools::ToolServer;
use netcli::transport::SshConnector;
use netcli::{DeviceBuilder, HostKeyVerification, ReadStrategy};

#[derive(Parser, Debug)]
#[command(name = "netcli", version, about = "Network device tool server over stdio")]
struct Args {
    /// Device hostname or IP address
    #[arg(long, env = "NETCLI_HOST")]
    host: String,

    /// SSH port
    #[arg(long, env = "NETCLI_PORT", default_value_t = 22)]
    port: u16,

    /// Login username
    #[arg(long, env = "NETCLI_USERNAME")]
    username: String,

    /// Login password
    #[arg(long, env = "NETCLI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Private key file, used instead of the password when set
    #[arg(long, env = "NETCLI_KEY_PATH")]
    key_path: Option<PathBuf>,

    /// Device platform (cisco_ios, mikrotik_routeros)
    #[arg(long, env = "NETCLI_PLATFORM", default_value = "cisco_ios")]
    platform: String,

    /// Connection timeout in seconds
    #[arg(long, env = "NETCLI_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Output completion: adaptive (until prompt), idle or fixed
    #[arg(long, env = "NETCLI_READ_STRATEGY", default_value = "adaptive")]
    read_strategy: ReadStrategy,

    /// Host key checking: strict, accept-new or disabled
    #[arg(long, env = "NETCLI_HOST_KEY", default_value = "accept-new")]
    host_key: HostKeyVerification,

    /// known_hosts file (default: ~/.ssh/known_hosts)
    #[arg(long, env = "NETCLI_KNOWN_HOSTS")]
    known_hosts: Option<PathBuf>,
}

fn build_client(args: Args) -> netcli::error::Result<DeviceClient<SshConnector>> {
    let mut builder = DeviceBuilder::new(args.host)
        .port(args.port)
        .username(args.username)
        .platform(args.platform)
        .timeout(Duration::from_secs(args.timeout))
        .read_strategy(args.read_strategy)
        .host_key_verification(args.host_key);

    if let Some(path) = args.known_hosts {
        builder = builder.known_hosts_path(path);
    }
    builder = match (args.key_path, args.password) {
        (Some(key), _) => builder.private_key(key),
        (None, Some(password)) => builder.password(password),
        (None, None) => builder,
    };
    builder.build()
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let client = match build_client(args) {
        Ok(client) => client,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "serving tools for {} ({})",
        client.config().socket_addr(),
        client.platform().name
    );
    if let Err(e) = ToolServer::new(client).serve_stdio().await {
        error!("tool server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
