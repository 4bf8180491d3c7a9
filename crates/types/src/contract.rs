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

use aakit_contracts::abi::{AA_WALLET_ABI, ACCOUNT_MANAGER_ABI, A_ACCOUNT_ABI};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The contracts AAKit has bindings for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum ContractKind {
    /// Smart contract account
    #[strum(serialize = "a-account")]
    #[serde(rename = "a-account")]
    AAccount,
    /// Smart contract wallet
    #[strum(serialize = "aa-wallet")]
    #[serde(rename = "aa-wallet")]
    AAWallet,
    /// Account factory
    #[strum(serialize = "account-manager")]
    #[serde(rename = "account-manager")]
    AccountManager,
}

impl ContractKind {
    /// Embedded ABI JSON document of the contract
    pub fn abi_json(&self) -> &'static str {
        match self {
            ContractKind::AAccount => A_ACCOUNT_ABI,
            ContractKind::AAWallet => AA_WALLET_ABI,
            ContractKind::AccountManager => ACCOUNT_MANAGER_ABI,
        }
    }
}
