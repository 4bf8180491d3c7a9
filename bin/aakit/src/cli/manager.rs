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

use aakit_provider::{AccountManager, AlloyAccountManager};
use aakit_utils::log::LogWithContext;
use alloy_primitives::{utils::format_ether, Address, U256};
use clap::{Args, Subcommand};

use super::CommonArgs;

#[derive(Debug, Args)]
pub(crate) struct ManagerCliArgs {
    /// Address of the account factory
    #[arg(long = "address", name = "address")]
    address: Address,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct AccountArgs {
    /// Owner of the account
    #[arg(long = "owner")]
    owner: Address,
    /// Salt distinguishing accounts of the same owner
    #[arg(long = "salt", default_value = "0")]
    salt: U256,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the implementation, entry point and owner of the factory
    #[command(name = "info")]
    Info,

    /// Print the counterfactual address of an account
    #[command(name = "get-address")]
    GetAddress(AccountArgs),

    /// Print the init code deploying an account, for a user operation
    #[command(name = "init-code")]
    InitCode(AccountArgs),

    /// Deploy an account
    #[command(name = "create-account")]
    CreateAccount(AccountArgs),

    /// Stake the factory at the entry point
    #[command(name = "add-stake")]
    AddStake {
        /// Unstake delay in seconds
        #[arg(long = "unstake_delay_sec", default_value = "86400")]
        unstake_delay_sec: u32,
        /// Stake in wei
        #[arg(long = "value")]
        value: U256,
    },

    /// Start the unstake delay of the factory
    #[command(name = "unlock-stake")]
    UnlockStake,

    /// Withdraw the unlocked stake of the factory
    #[command(name = "withdraw-stake")]
    WithdrawStake {
        /// Recipient of the stake
        #[arg(long = "to")]
        to: Address,
    },
}

pub(crate) async fn run(args: ManagerCliArgs, common: &CommonArgs) -> anyhow::Result<()> {
    let manager = AlloyAccountManager::new(args.address, common.provider()?);

    match args.command {
        Command::Info => {
            let implementation = manager
                .account_implementation()
                .await
                .log_context("failed to get account implementation")?;
            let entry_point = manager
                .entry_point()
                .await
                .log_context("failed to get entry point")?;
            let owner = manager.owner().await.log_context("failed to get owner")?;
            println!("Factory:        {:?}", manager.address());
            println!("Implementation: {implementation:?}");
            println!("Entry point:    {entry_point:?}");
            println!("Owner:          {owner:?}");
        }
        Command::GetAddress(AccountArgs { owner, salt }) => {
            let account = manager.get_address(owner, salt).await?;
            let deployed = manager.is_account(account).await?;
            println!("Account:  {account:?}");
            println!("Deployed: {deployed}");
        }
        Command::InitCode(AccountArgs { owner, salt }) => {
            println!("{}", manager.init_code(owner, salt));
        }
        Command::CreateAccount(AccountArgs { owner, salt }) => {
            let tx_hash = manager.create_account(owner, salt).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::AddStake {
            unstake_delay_sec,
            value,
        } => {
            tracing::info!(
                "Staking {} ETH with an unstake delay of {unstake_delay_sec}s",
                format_ether(value)
            );
            let tx_hash = manager.add_stake(unstake_delay_sec, value).await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::UnlockStake => {
            let tx_hash = manager.unlock_stake().await?;
            println!("Transaction: {tx_hash:?}");
        }
        Command::WithdrawStake { to } => {
            let tx_hash = manager.withdraw_stake(to).await?;
            println!("Transaction: {tx_hash:?}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn test_parse_add_stake() {
        let opt = Cli::try_parse_from([
            "aakit",
            "manager",
            "--address",
            "0x00000000000000000000000000000000000fac70",
            "add-stake",
            "--value",
            "1000000000000000000",
        ]);
        assert!(opt.is_ok());
    }

    #[test]
    fn test_parse_requires_owner() {
        let opt = Cli::try_parse_from([
            "aakit",
            "manager",
            "--address",
            "0x00000000000000000000000000000000000fac70",
            "init-code",
            "--salt",
            "1",
        ]);
        assert!(opt.is_err());
    }
}
