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

//! Embedded ABI documents of the deployed contracts

use alloy_json_abi::JsonAbi;

/// ABI JSON of the `AAccount` contract
pub const A_ACCOUNT_ABI: &str = include_str!("../abi/AAccount.json");

/// ABI JSON of the `AAWallet` contract
pub const AA_WALLET_ABI: &str = include_str!("../abi/AAWallet.json");

/// ABI JSON of the `AccountManager` contract
pub const ACCOUNT_MANAGER_ABI: &str = include_str!("../abi/AccountManager.json");

/// Parse an embedded ABI document
pub fn parse_abi(json: &str) -> Result<JsonAbi, serde_json::Error> {
    serde_json::from_str(json)
}
