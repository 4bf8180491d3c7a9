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

use aakit_contracts::v0_7::AccountManager::{self as AccountManagerContract, AccountManagerInstance};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;
use tracing::instrument;

use crate::{AccountManager, AlloyProvider, ProviderResult};

/// [`AccountManager`] backed by the `AccountManager` factory contract
#[derive(Debug, Clone)]
pub struct AlloyAccountManager<AP> {
    instance: AccountManagerInstance<AP>,
}

impl<AP: AlloyProvider> AlloyAccountManager<AP> {
    /// Bind to the factory deployed at `address`
    pub fn new(address: Address, provider: AP) -> Self {
        Self {
            instance: AccountManagerInstance::new(address, provider),
        }
    }
}

#[async_trait::async_trait]
impl<AP: AlloyProvider> AccountManager for AlloyAccountManager<AP> {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    #[instrument(skip_all)]
    async fn account_implementation(&self) -> ProviderResult<Address> {
        Ok(self.instance.accountImplementation().call().await?)
    }

    #[instrument(skip_all)]
    async fn entry_point(&self) -> ProviderResult<Address> {
        Ok(self.instance.entryPoint().call().await?)
    }

    #[instrument(skip_all)]
    async fn owner(&self) -> ProviderResult<Address> {
        Ok(self.instance.owner().call().await?)
    }

    #[instrument(skip_all)]
    async fn get_address(&self, owner: Address, salt: U256) -> ProviderResult<Address> {
        Ok(self.instance.getAddress(owner, salt).call().await?)
    }

    #[instrument(skip_all)]
    async fn is_account(&self, account: Address) -> ProviderResult<bool> {
        Ok(self.instance.isAccount(account).call().await?)
    }

    fn create_account_call_data(&self, owner: Address, salt: U256) -> Bytes {
        AccountManagerContract::createAccountCall { owner, salt }
            .abi_encode()
            .into()
    }

    fn init_code(&self, owner: Address, salt: U256) -> Bytes {
        let call_data = self.create_account_call_data(owner, salt);
        [self.instance.address().as_slice(), &call_data[..]]
            .concat()
            .into()
    }

    #[instrument(skip_all)]
    async fn create_account(&self, owner: Address, salt: U256) -> ProviderResult<TxHash> {
        let pending = self.instance.createAccount(owner, salt).send().await?;
        Ok(*pending.tx_hash())
    }

    #[instrument(skip_all)]
    async fn add_stake(&self, unstake_delay_sec: u32, value: U256) -> ProviderResult<TxHash> {
        let pending = self
            .instance
            .addStake(unstake_delay_sec)
            .value(value)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    #[instrument(skip_all)]
    async fn unlock_stake(&self) -> ProviderResult<TxHash> {
        let pending = self.instance.unlockStake().send().await?;
        Ok(*pending.tx_hash())
    }

    #[instrument(skip_all)]
    async fn withdraw_stake(&self, to: Address) -> ProviderResult<TxHash> {
        let pending = self.instance.withdrawStake(to).send().await?;
        Ok(*pending.tx_hash())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, hex};
    use alloy_provider::ProviderBuilder;
    use alloy_sol_types::SolValue;
    use alloy_transport::mock::Asserter;

    use super::*;
    use crate::ProviderError;

    const FACTORY: Address = address!("00000000000000000000000000000000000fac70");

    fn manager() -> (AlloyAccountManager<impl AlloyProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::default().connect_mocked_client(asserter.clone());
        (AlloyAccountManager::new(FACTORY, provider), asserter)
    }

    #[tokio::test]
    async fn test_get_address() {
        let (manager, asserter) = manager();
        let account = Address::random();
        asserter.push_success(&Bytes::from(account.abi_encode()));

        let got = manager
            .get_address(Address::random(), U256::from(1))
            .await
            .unwrap();
        assert_eq!(got, account);
    }

    #[tokio::test]
    async fn test_is_account_bad_return_data() {
        let (manager, asserter) = manager();
        asserter.push_success(&Bytes::new());

        let err = manager.is_account(Address::random()).await.unwrap_err();
        assert!(matches!(err, ProviderError::ContractError(_)));
    }

    #[tokio::test]
    async fn test_add_stake() {
        let (manager, asserter) = manager();
        let tx_hash = b256!("00000000000000000000000000000000000000000000000000000000000000bb");
        asserter.push_success(&tx_hash);

        let got = manager.add_stake(86400, U256::from(10).pow(U256::from(18))).await;
        assert_eq!(got.unwrap(), tx_hash);
    }

    #[test]
    fn test_init_code() {
        let (manager, _) = manager();
        let owner = address!("00000000000000000000000000000000000000b2");
        let init_code = manager.init_code(owner, U256::from(3));

        assert_eq!(&init_code[..20], FACTORY.as_slice());
        assert_eq!(
            init_code[20..],
            manager.create_account_call_data(owner, U256::from(3))[..]
        );
        assert_eq!(init_code[20..24], hex!("5fbfb9cf"));

        let decoded = AccountManagerContract::createAccountCall::abi_decode(&init_code[20..]).unwrap();
        assert_eq!(decoded.owner, owner);
        assert_eq!(decoded.salt, U256::from(3));
    }
}
