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

use std::{fs, path::PathBuf};

use aakit_contracts::v0_7::PackedUserOperation;
use aakit_provider::{AlloyEvmProvider, EvmProvider};
use aakit_types::UserOperation;
use alloy_primitives::{address, Address};
use anyhow::Context;
use clap::{Args, Subcommand};
use serde_json::json;

use super::CommonArgs;

/// Canonical address of the v0.7 entry point
const ENTRY_POINT_V0_7: Address = address!("0000000071727De22E5E9d8BAf0edAc6f37da032");

#[derive(Debug, Args)]
pub(crate) struct UserOpCliArgs {
    /// JSON file holding the user operation
    #[arg(long = "file", name = "file")]
    file: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the user operation in its packed on-chain form
    #[command(name = "pack")]
    Pack,

    /// Print the hash of the user operation
    #[command(name = "hash")]
    Hash {
        /// Entry point the operation is sent to
        #[arg(long = "entry_point", default_value_t = ENTRY_POINT_V0_7)]
        entry_point: Address,
        /// Chain id, fetched from the node if not provided
        #[arg(long = "chain_id")]
        chain_id: Option<u64>,
    },
}

pub(crate) async fn run(args: UserOpCliArgs, common: &CommonArgs) -> anyhow::Result<()> {
    let user_op = read_user_op(&args.file)?;

    match args.command {
        Command::Pack => {
            let packed = packed_json(&user_op.pack());
            println!("{}", serde_json::to_string_pretty(&packed)?);
        }
        Command::Hash {
            entry_point,
            chain_id,
        } => {
            let chain_id = match chain_id {
                Some(chain_id) => chain_id,
                None => {
                    AlloyEvmProvider::new(common.provider()?)
                        .get_chain_id()
                        .await?
                }
            };
            println!("{:?}", user_op.hash(entry_point, chain_id));
        }
    }

    Ok(())
}

fn read_user_op(file: &PathBuf) -> anyhow::Result<UserOperation> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} should hold a user operation", file.display()))
}

fn packed_json(op: &PackedUserOperation) -> serde_json::Value {
    json!({
        "sender": op.sender,
        "nonce": op.nonce,
        "initCode": op.initCode,
        "callData": op.callData,
        "accountGasLimits": op.accountGasLimits,
        "preVerificationGas": op.preVerificationGas,
        "gasFees": op.gasFees,
        "paymasterAndData": op.paymasterAndData,
        "signature": op.signature,
    })
}
