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

use aakit_provider::{AlloyAccount, AlloyWallet, DynProvider, SmartAccount};
use aakit_types::{Call, ContractKind};
use aakit_utils::log::LogWithContext;
use alloy_primitives::{utils::format_ether, Address, U256};
use anyhow::bail;
use clap::{Args, Subcommand};

use super::CommonArgs;

#[derive(Debug, Args)]
pub(crate) struct AccountCliArgs {
    /// Account contract: a-account or aa-wallet
    #[arg(long = "kind", name = "kind", default_value = "a-account", global = true)]
    kind: ContractKind,

    /// Address of the account
    #[arg(long = "address", name = "address", global = true)]
    address: Option<Address>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the owner, entry point, nonce and deposit of the account
    #[command(name = "info")]
    Info,

    /// Execute a call from the account
    #[command(name = "execute")]
    Execute {
        /// Call in the form target[:value[:data]]
        call: Call,
    },

    /// Execute several calls from the account in one transaction
    #[command(name = "execute-batch")]
    ExecuteBatch {
        /// Calls in the form target[:value[:data]]
        #[arg(required = true)]
        calls: Vec<Call>,
    },

    /// Print the call data executing the given calls, for a user operation
    #[command(name = "call-data")]
    CallData {
        /// Calls in the form target[:value[:data]]. More than one produces a batch.
        #[arg(required = true)]
        calls: Vec<Call>,
    },

    /// Add to the account's deposit at the entry point
    #[command(name = "deposit")]
    Deposit {
        /// Amount in wei
        #[arg(long = "value")]
        value: U256,
    },

    /// Withdraw from the account's deposit at the entry point
    #[command(name = "withdraw")]
    Withdraw {
        /// Recipient of the withdrawal
        #[arg(long = "to")]
        to: Address,
        /// Amount in wei
        #[arg(long = "amount")]
        amount: U256,
    },

    /// Set the owner of an uninitialized a-account
    #[command(name = "initialize")]
    Initialize {
        /// New owner
        #[arg(long = "owner")]
        owner: Address,
    },

    /// Transfer an aa-wallet to a new owner
    #[command(name = "transfer-ownership")]
    TransferOwnership {
        /// New owner
        #[arg(long = "new_owner")]
        new_owner: Address,
    },
}

enum BoundAccount {
    Account(AlloyAccount<DynProvider>),
    Wallet(AlloyWallet<DynProvider>),
}

impl BoundAccount {
    fn new(kind: ContractKind, address: Address, provider: DynProvider) -> anyhow::Result<Self> {
        match kind {
            ContractKind::AAccount => Ok(Self::Account(AlloyAccount::new(address, provider))),
            ContractKind::AAWallet => Ok(Self::Wallet(AlloyWallet::new(address, provider))),
            ContractKind::AccountManager => {
                bail!("account-manager is not an account, use the manager command")
            }
        }
    }

    fn as_smart_account(&self) -> &dyn SmartAccount {
        match self {
            Self::Account(account) => account,
            Self::Wallet(wallet) => wallet,
        }
    }
}

pub(crate) async fn run(args: AccountCliArgs, common: &CommonArgs) -> anyhow::Result<()> {
    let address = args.address.unwrap_or_default();
    if args.address.is_none() && !matches!(args.command, Command::CallData { .. }) {
        bail!("--address is required");
    }
    let bound = BoundAccount::new(args.kind, address, common.provider()?)?;
    let account = bound.as_smart_account();

    match args.command {
        Command::Info => {
            let owner = account.owner().await.log_context("failed to get owner")?;
            let entry_point = account
                .entry_point()
                .await
                .log_context("failed to get entry point")?;
            let nonce = account.get_nonce().await.log_context("failed to get nonce")?;
            let deposit = account
                .get_deposit()
                .await
                .log_context("failed to get deposit")?;
            println!("Account:     {:?} ({})", account.address(), account.kind());
            println!("Owner:       {owner:?}");
            println!("Entry point: {entry_point:?}");
            println!("Nonce:       {nonce}");
            println!("Deposit:     {} ETH", format_ether(deposit));
        }
        Command::Execute { call } => {
            let tx_hash = account.execute(call).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::ExecuteBatch { calls } => {
            let tx_hash = account.execute_batch(calls).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::CallData { mut calls } => {
            let call_data = if calls.len() == 1 {
                account.execute_call_data(calls.remove(0))
            } else {
                account.execute_batch_call_data(calls)
            };
            println!("{call_data}");
        }
        Command::Deposit { value } => {
            let tx_hash = account.add_deposit(value).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::Withdraw { to, amount } => {
            let tx_hash = account.withdraw_deposit_to(to, amount).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::Initialize { owner } => {
            let BoundAccount::Account(account) = &bound else {
                bail!("initialize is only supported by a-account");
            };
            let tx_hash = account.initialize(owner).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::TransferOwnership { new_owner } => {
            let BoundAccount::Wallet(wallet) = &bound else {
                bail!("transfer-ownership is only supported by aa-wallet");
            };
            let tx_hash = wallet.transfer_ownership(new_owner).await?;
            println!("Transaction: {tx_hash:?}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    #[test]
    fn test_parse_execute_batch() {
        let opt = Cli::try_parse_from([
            "aakit",
            "account",
            "--kind",
            "aa-wallet",
            "--address",
            "0x00000000000000000000000000000000000a11ce",
            "execute-batch",
            "0x00000000000000000000000000000000000000b0:1",
            "0x00000000000000000000000000000000000000b1:0:0xdeadbeef",
        ]);
        assert!(opt.is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_call() {
        let opt = Cli::try_parse_from(["aakit", "account", "execute", "0x1234:1"]);
        assert!(opt.is_err());
    }

    #[tokio::test]
    async fn test_manager_is_not_an_account() {
        let provider = aakit_provider::new_alloy_provider("http://localhost:8545", 1, None).unwrap();
        assert!(BoundAccount::new(ContractKind::AccountManager, Address::ZERO, provider).is_err());
    }
}
