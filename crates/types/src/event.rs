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

use std::fmt::{Debug, Display};

use alloy_primitives::{Address, TxHash, B256};

/// A decoded contract event with the metadata of the log that carried it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEvent<E> {
    /// The decoded event
    pub event: E,
    /// Address of the emitting contract
    pub address: Address,
    /// Block number of the log, absent for pending logs
    pub block_number: Option<u64>,
    /// Block hash of the log, absent for pending logs
    pub block_hash: Option<B256>,
    /// Transaction that emitted the event
    pub transaction_hash: Option<TxHash>,
    /// Index of the log in its block
    pub log_index: Option<u64>,
}

impl<E: Debug> Display for ContractEvent<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}    Contract: {:?}", self.event, self.address)?;
        if let Some(block_number) = self.block_number {
            write!(f, "    Block: {block_number}")?;
        }
        if let Some(tx_hash) = self.transaction_hash {
            write!(f, "    Transaction: {tx_hash:?}")?;
        }
        Ok(())
    }
}
