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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! AAKit providers
//! A provider wraps a JSON-RPC connection and exposes the account contracts on top of it

mod alloy;
pub use alloy::{
    account::{AlloyAccount, AlloyWallet},
    account_manager::AlloyAccountManager,
    evm::AlloyEvmProvider,
    new_alloy_evm_provider, new_alloy_provider,
};

mod events;
pub use events::{LogWatcher, LogWatcherSettings, Subscription};

mod traits;
pub use alloy_provider::DynProvider;
pub use alloy_rpc_types_eth::{BlockId, BlockNumberOrTag, Filter, Log};
pub use alloy_signer_local::PrivateKeySigner;
pub use traits::*;

/// Alloy providers the bindings can run on
pub trait AlloyProvider: alloy_provider::Provider + Clone + 'static {}

impl<T> AlloyProvider for T where T: alloy_provider::Provider + Clone + 'static {}
