// This file is part of AAKit.
//
// AAKit is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// AAKit is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with AAKit.
// If not, see https://www.gnu.org/licenses/.

use aakit_provider::{new_alloy_provider, DynProvider};
use abi::AbiCliArgs;
use account::AccountCliArgs;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use events::EventsCliArgs;
use manager::ManagerCliArgs;
use signer::SignerArgs;
use user_op::UserOpCliArgs;

mod abi;
mod account;
mod events;
mod manager;
mod metrics;
mod signer;
mod tracing;
mod user_op;

/// Main entry point for the CLI
///
/// Parses the CLI arguments and runs the selected subcommand.
pub async fn run() -> anyhow::Result<()> {
    let opt = Cli::parse();
    let _guard = tracing::configure_logging(&opt.logs)?;
    tracing::info!("Parsed CLI options: {:#?}", opt);

    if let Some(port) = opt.metrics.port {
        let metrics_addr = format!("{}:{}", opt.metrics.host, port).parse()?;
        metrics::initialize(metrics_addr, &opt.metrics.tags)
            .context("metrics server should start")?;
    }

    match opt.command {
        Command::Abi(args) => abi::run(args)?,
        Command::Account(args) => account::run(args, &opt.common).await?,
        Command::Manager(args) => manager::run(args, &opt.common).await?,
        Command::Events(args) => events::run(args, &opt.common).await?,
        Command::UserOp(args) => user_op::run(args, &opt.common).await?,
    }

    Ok(())
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect the embedded contract ABIs
    #[command(name = "abi")]
    Abi(AbiCliArgs),

    /// Read from and transact with an account contract
    #[command(name = "account")]
    Account(AccountCliArgs),

    /// Read from and transact with the account factory
    #[command(name = "manager")]
    Manager(ManagerCliArgs),

    /// Query and watch contract events
    #[command(name = "events")]
    Events(EventsCliArgs),

    /// Pack and hash user operations
    #[command(name = "user-op")]
    UserOp(UserOpCliArgs),
}

/// CLI common options
#[derive(Debug, Args)]
#[command(next_help_heading = "Common")]
pub struct CommonArgs {
    /// ETH Node HTTP URL to connect to
    #[arg(
        long = "node_http",
        name = "node_http",
        env = "NODE_HTTP",
        default_value = "http://localhost:8545",
        global = true
    )]
    node_http: String,

    /// Client side timeout of a single RPC request
    #[arg(
        long = "provider_client_timeout_seconds",
        name = "provider_client_timeout_seconds",
        env = "PROVIDER_CLIENT_TIMEOUT_SECONDS",
        default_value = "10",
        global = true
    )]
    provider_client_timeout_seconds: u64,

    #[clap(flatten)]
    signer: SignerArgs,
}

impl CommonArgs {
    /// Provider for the configured node, signing with the configured key
    pub fn provider(&self) -> anyhow::Result<DynProvider> {
        new_alloy_provider(
            &self.node_http,
            self.provider_client_timeout_seconds,
            self.signer.signer()?,
        )
        .context("provider should be created from node_http")
    }
}

/// CLI options for the metrics exporter
#[derive(Debug, Args)]
#[command(next_help_heading = "Metrics")]
pub struct MetricsArgs {
    /// Port to listen on for metrics requests
    ///
    /// If not provided, metrics are not exported
    #[arg(
        long = "metrics.port",
        name = "metrics.port",
        env = "METRICS_PORT",
        global = true
    )]
    port: Option<u16>,

    /// Host to listen on for metrics requests
    #[arg(
        long = "metrics.host",
        name = "metrics.host",
        env = "METRICS_HOST",
        default_value = "0.0.0.0",
        global = true
    )]
    host: String,

    /// Tags for metrics
    ///
    /// Format: key1=value1,key2=value2,...
    #[arg(
        long = "metrics.tags",
        name = "metrics.tags",
        env = "METRICS_TAGS",
        default_values_t = Vec::<String>::new(),
        value_delimiter = ',',
        global = true
    )]
    tags: Vec<String>,
}

/// CLI options for logging
#[derive(Debug, Args)]
#[command(next_help_heading = "Logging")]
pub struct LogsArgs {
    /// Log file
    ///
    /// If not provided, logs will be written to stderr
    #[arg(
        long = "log.file",
        name = "log.file",
        env = "LOG_FILE",
        default_value = None,
        global = true
    )]
    file: Option<String>,

    /// Log JSON
    ///
    /// If set, logs will be written in JSON format
    #[arg(
        long = "log.json",
        name = "log.json",
        env = "LOG_JSON",
        required = false,
        num_args = 0,
        global = true
    )]
    json: bool,
}

/// CLI options
#[derive(Debug, Parser)]
#[command(name = "aakit", version)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    common: CommonArgs,

    #[clap(flatten)]
    metrics: MetricsArgs,

    #[clap(flatten)]
    logs: LogsArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_common_args() {
        let opt = Cli::try_parse_from([
            "aakit",
            "abi",
            "show",
            "account-manager",
            "--node_http",
            "http://node:8545",
            "--provider_client_timeout_seconds",
            "3",
            "--log.json",
        ])
        .unwrap();

        assert_eq!(opt.common.node_http, "http://node:8545");
        assert_eq!(opt.common.provider_client_timeout_seconds, 3);
        assert!(opt.logs.json);
        assert!(opt.metrics.port.is_none());
        assert!(matches!(opt.command, Command::Abi(_)));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["aakit"]).is_err());
    }
}
