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

//! Traits for the account contracts and their factory

use aakit_types::{Call, ContractKind, UserOperation, ValidationData};
use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// A deployed smart contract account
///
/// View methods are `eth_call`s against the latest block. Transaction methods
/// return the hash of the submitted transaction without waiting for inclusion.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait SmartAccount: Send + Sync {
    /// The kind of account contract
    fn kind(&self) -> ContractKind;

    /// Address of the account
    fn address(&self) -> Address;

    /// Entry point the account trusts
    async fn entry_point(&self) -> ProviderResult<Address>;

    /// Current owner of the account
    async fn owner(&self) -> ProviderResult<Address>;

    /// Next nonce of the account, as tracked by the entry point
    async fn get_nonce(&self) -> ProviderResult<U256>;

    /// Deposit of the account at the entry point
    async fn get_deposit(&self) -> ProviderResult<U256>;

    /// Check an ERC-1271 signature over `hash`
    async fn is_valid_signature(&self, hash: B256, signature: Bytes) -> ProviderResult<bool>;

    /// Simulate `validateUserOp` as if called by the entry point
    async fn simulate_validate_user_op(
        &self,
        user_op: UserOperation,
        user_op_hash: B256,
        missing_account_funds: U256,
    ) -> ProviderResult<ValidationData>;

    /// Encode an `execute` call, for use as user operation call data
    fn execute_call_data(&self, call: Call) -> Bytes;

    /// Encode an `executeBatch` call, for use as user operation call data
    fn execute_batch_call_data(&self, calls: Vec<Call>) -> Bytes;

    /// Encode a `validateUserOp` call
    fn validate_user_op_call_data(
        &self,
        user_op: UserOperation,
        user_op_hash: B256,
        missing_account_funds: U256,
    ) -> Bytes;

    /// Execute a single call from the account
    async fn execute(&self, call: Call) -> ProviderResult<TxHash>;

    /// Execute a batch of calls from the account
    async fn execute_batch(&self, calls: Vec<Call>) -> ProviderResult<TxHash>;

    /// Add `value` wei to the account's entry point deposit
    async fn add_deposit(&self, value: U256) -> ProviderResult<TxHash>;

    /// Withdraw `amount` wei of the account's deposit to `to`
    async fn withdraw_deposit_to(&self, to: Address, amount: U256) -> ProviderResult<TxHash>;
}

/// The account factory contract
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait AccountManager: Send + Sync {
    /// Address of the factory
    fn address(&self) -> Address;

    /// Implementation the factory's account proxies point at
    async fn account_implementation(&self) -> ProviderResult<Address>;

    /// Entry point of the accounts the factory creates
    async fn entry_point(&self) -> ProviderResult<Address>;

    /// Owner of the factory
    async fn owner(&self) -> ProviderResult<Address>;

    /// Counterfactual address of the account for `owner` and `salt`
    async fn get_address(&self, owner: Address, salt: U256) -> ProviderResult<Address>;

    /// Whether `account` was created by this factory
    async fn is_account(&self, account: Address) -> ProviderResult<bool>;

    /// Encode a `createAccount` call
    fn create_account_call_data(&self, owner: Address, salt: U256) -> Bytes;

    /// Factory address followed by the `createAccount` call data, as packed
    /// into a user operation's `initCode`
    fn init_code(&self, owner: Address, salt: U256) -> Bytes;

    /// Deploy the account for `owner` and `salt`
    async fn create_account(&self, owner: Address, salt: U256) -> ProviderResult<TxHash>;

    /// Stake `value` wei for the factory at the entry point
    async fn add_stake(&self, unstake_delay_sec: u32, value: U256) -> ProviderResult<TxHash>;

    /// Start the unstake delay
    async fn unlock_stake(&self) -> ProviderResult<TxHash>;

    /// Withdraw the unlocked stake to `to`
    async fn withdraw_stake(&self, to: Address) -> ProviderResult<TxHash>;
}
