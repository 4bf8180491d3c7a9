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

use std::{fmt::Debug, time::Duration};

use aakit_contracts::v0_7::{
    AAWallet::AAWalletEvents, AAccount::AAccountEvents, AccountManager::AccountManagerEvents,
    EventTopics,
};
use aakit_provider::{AlloyEvmProvider, DynProvider, EvmProvider, LogWatcher, LogWatcherSettings};
use aakit_types::ContractKind;
use alloy_primitives::Address;
use clap::{Args, Subcommand};
use tokio::sync::mpsc;

use super::CommonArgs;

#[derive(Debug, Args)]
pub(crate) struct EventsCliArgs {
    /// How often a watch polls for new blocks
    #[arg(
        long = "events.poll_interval_millis",
        name = "events.poll_interval_millis",
        env = "EVENTS_POLL_INTERVAL_MILLIS",
        default_value = "2000",
        global = true
    )]
    poll_interval_millis: u64,

    /// Maximum number of blocks fetched by a single eth_getLogs
    #[arg(
        long = "events.max_block_range",
        name = "events.max_block_range",
        env = "EVENTS_MAX_BLOCK_RANGE",
        default_value = "2000",
        global = true
    )]
    max_block_range: u64,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the events a contract emitted in a block range
    #[command(name = "query")]
    Query {
        /// Contract: a-account, aa-wallet or account-manager
        contract: ContractKind,
        /// Address of the contract
        #[arg(long = "address")]
        address: Address,
        /// First block to search
        #[arg(long = "from_block", default_value = "0")]
        from_block: u64,
        /// Last block to search, defaults to the latest block
        #[arg(long = "to_block")]
        to_block: Option<u64>,
    },

    /// Print the events of a contract as they are emitted, until ctrl-c
    #[command(name = "watch")]
    Watch {
        /// Contract: a-account, aa-wallet or account-manager
        contract: ContractKind,
        /// Address of the contract
        #[arg(long = "address")]
        address: Address,
        /// First block to watch, defaults to the block after the latest one
        #[arg(long = "from_block")]
        from_block: Option<u64>,
    },
}

type Watcher = LogWatcher<AlloyEvmProvider<DynProvider>>;

pub(crate) async fn run(args: EventsCliArgs, common: &CommonArgs) -> anyhow::Result<()> {
    let settings = LogWatcherSettings {
        poll_interval: Duration::from_millis(args.poll_interval_millis),
        max_block_range: args.max_block_range,
        ..Default::default()
    };
    let evm = AlloyEvmProvider::new(common.provider()?);
    let watcher = LogWatcher::new(evm.clone(), settings);

    match args.command {
        Command::Query {
            contract,
            address,
            from_block,
            to_block,
        } => {
            let to_block = match to_block {
                Some(block) => block,
                None => evm.get_block_number().await?,
            };
            match contract {
                ContractKind::AAccount => {
                    query::<AAccountEvents>(&watcher, address, from_block, to_block).await
                }
                ContractKind::AAWallet => {
                    query::<AAWalletEvents>(&watcher, address, from_block, to_block).await
                }
                ContractKind::AccountManager => {
                    query::<AccountManagerEvents>(&watcher, address, from_block, to_block).await
                }
            }
        }
        Command::Watch {
            contract,
            address,
            from_block,
        } => match contract {
            ContractKind::AAccount => watch::<AAccountEvents>(&watcher, address, from_block).await,
            ContractKind::AAWallet => watch::<AAWalletEvents>(&watcher, address, from_block).await,
            ContractKind::AccountManager => {
                watch::<AccountManagerEvents>(&watcher, address, from_block).await
            }
        },
    }
}

async fn query<E: EventTopics + Debug>(
    watcher: &Watcher,
    address: Address,
    from_block: u64,
    to_block: u64,
) -> anyhow::Result<()> {
    let events = watcher.query::<E>(address, from_block, to_block).await?;
    for event in &events {
        println!("{event}");
    }
    tracing::info!(
        "Found {} {} events in blocks {from_block}..={to_block}",
        events.len(),
        E::NAME
    );
    Ok(())
}

async fn watch<E>(watcher: &Watcher, address: Address, from_block: Option<u64>) -> anyhow::Result<()>
where
    E: EventTopics + Debug + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel(1024);
    let subscription = watcher.watch::<E>(address, from_block, tx).await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received ctrl-c, unsubscribing");
                break;
            }
            event = rx.recv() => match event {
                Some(event) => println!("{event}"),
                None => break,
            },
        }
    }

    drop(rx);
    subscription.unsubscribe().await?;
    Ok(())
}
