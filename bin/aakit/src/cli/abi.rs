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

use aakit_contracts::abi::parse_abi;
use aakit_types::ContractKind;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub(crate) struct AbiCliArgs {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the ABI JSON of a contract
    #[command(name = "show")]
    Show {
        /// Contract: a-account, aa-wallet or account-manager
        contract: ContractKind,
    },
    /// Print the function selectors and event topics of a contract
    #[command(name = "selectors")]
    Selectors {
        /// Contract: a-account, aa-wallet or account-manager
        contract: ContractKind,
    },
}

pub(crate) fn run(args: AbiCliArgs) -> anyhow::Result<()> {
    match args.command {
        Command::Show { contract } => println!("{}", contract.abi_json()),
        Command::Selectors { contract } => {
            for line in selector_lines(contract)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn selector_lines(contract: ContractKind) -> anyhow::Result<Vec<String>> {
    let abi = parse_abi(contract.abi_json())?;
    let functions = abi.functions().map(|function| {
        format!(
            "function {} {}",
            const_hex::encode_prefixed(function.selector()),
            function.signature()
        )
    });
    let events = abi.events().map(|event| {
        format!(
            "event    {} {}",
            const_hex::encode_prefixed(event.selector()),
            event.signature()
        )
    });
    Ok(functions.chain(events).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_lines() {
        let lines = selector_lines(ContractKind::AAccount).unwrap();
        assert!(lines.contains(&"function 0xb61d27f6 execute(address,uint256,bytes)".to_string()));
        assert!(lines.contains(&"function 0x1626ba7e isValidSignature(bytes32,bytes)".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("event ") && l.ends_with("AccountInitialized(address,address)")));
    }

    #[test]
    fn test_manager_has_no_account_functions() {
        let lines = selector_lines(ContractKind::AccountManager).unwrap();
        assert!(lines.iter().any(|l| l.ends_with("createAccount(address,uint256)")));
        assert!(!lines.iter().any(|l| l.contains(" execute(")));
    }
}
