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

use aakit_contracts::{
    v0_7::{
        AAWallet::{self, AAWalletInstance},
        AAccount::{self, AAccountInstance},
    },
    ERC1271_MAGIC_VALUE,
};
use aakit_types::{parse_validation_data, Call, ContractKind, UserOperation, ValidationData};
use alloy_primitives::{Address, Bytes, FixedBytes, TxHash, B256, U256};
use alloy_sol_types::SolCall;
use tracing::instrument;

use crate::{AlloyProvider, ProviderResult, SmartAccount};

/// [`SmartAccount`] backed by the `AAccount` contract
#[derive(Debug, Clone)]
pub struct AlloyAccount<AP> {
    instance: AAccountInstance<AP>,
}

/// [`SmartAccount`] backed by the `AAWallet` contract
#[derive(Debug, Clone)]
pub struct AlloyWallet<AP> {
    instance: AAWalletInstance<AP>,
}

impl<AP: AlloyProvider> AlloyAccount<AP> {
    /// Bind to the account deployed at `address`
    pub fn new(address: Address, provider: AP) -> Self {
        Self {
            instance: AAccountInstance::new(address, provider),
        }
    }

    /// Set the owner of a freshly deployed account proxy
    #[instrument(skip_all)]
    pub async fn initialize(&self, owner: Address) -> ProviderResult<TxHash> {
        let pending = self.instance.initialize(owner).send().await?;
        Ok(*pending.tx_hash())
    }

    /// ERC-165 interface check
    #[instrument(skip_all)]
    pub async fn supports_interface(&self, interface_id: FixedBytes<4>) -> ProviderResult<bool> {
        Ok(self.instance.supportsInterface(interface_id).call().await?)
    }
}

impl<AP: AlloyProvider> AlloyWallet<AP> {
    /// Bind to the wallet deployed at `address`
    pub fn new(address: Address, provider: AP) -> Self {
        Self {
            instance: AAWalletInstance::new(address, provider),
        }
    }

    /// Hand the wallet over to `new_owner`
    #[instrument(skip_all)]
    pub async fn transfer_ownership(&self, new_owner: Address) -> ProviderResult<TxHash> {
        let pending = self.instance.transferOwnership(new_owner).send().await?;
        Ok(*pending.tx_hash())
    }
}

// Both contracts expose the same account surface with identical signatures.
macro_rules! impl_smart_account {
    ($account:ident, $contract:ident, $kind:expr) => {
        #[async_trait::async_trait]
        impl<AP: AlloyProvider> SmartAccount for $account<AP> {
            fn kind(&self) -> ContractKind {
                $kind
            }

            fn address(&self) -> Address {
                *self.instance.address()
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
            async fn get_nonce(&self) -> ProviderResult<U256> {
                Ok(self.instance.getNonce().call().await?)
            }

            #[instrument(skip_all)]
            async fn get_deposit(&self) -> ProviderResult<U256> {
                Ok(self.instance.getDeposit().call().await?)
            }

            #[instrument(skip_all)]
            async fn is_valid_signature(
                &self,
                hash: B256,
                signature: Bytes,
            ) -> ProviderResult<bool> {
                let magic = self
                    .instance
                    .isValidSignature(hash, signature)
                    .call()
                    .await?;
                Ok(magic == ERC1271_MAGIC_VALUE)
            }

            #[instrument(skip_all)]
            async fn simulate_validate_user_op(
                &self,
                user_op: UserOperation,
                user_op_hash: B256,
                missing_account_funds: U256,
            ) -> ProviderResult<ValidationData> {
                let entry_point = SmartAccount::entry_point(self).await?;
                let data = self
                    .instance
                    .validateUserOp(user_op.pack(), user_op_hash, missing_account_funds)
                    .from(entry_point)
                    .call()
                    .await?;
                Ok(parse_validation_data(data))
            }

            fn execute_call_data(&self, call: Call) -> Bytes {
                $contract::executeCall {
                    dest: call.target,
                    value: call.value,
                    func: call.data,
                }
                .abi_encode()
                .into()
            }

            fn execute_batch_call_data(&self, calls: Vec<Call>) -> Bytes {
                $contract::executeBatchCall {
                    calls: calls.into_iter().map(Into::into).collect(),
                }
                .abi_encode()
                .into()
            }

            fn validate_user_op_call_data(
                &self,
                user_op: UserOperation,
                user_op_hash: B256,
                missing_account_funds: U256,
            ) -> Bytes {
                $contract::validateUserOpCall {
                    userOp: user_op.pack(),
                    userOpHash: user_op_hash,
                    missingAccountFunds: missing_account_funds,
                }
                .abi_encode()
                .into()
            }

            #[instrument(skip_all)]
            async fn execute(&self, call: Call) -> ProviderResult<TxHash> {
                let pending = self
                    .instance
                    .execute(call.target, call.value, call.data)
                    .send()
                    .await?;
                Ok(*pending.tx_hash())
            }

            #[instrument(skip_all)]
            async fn execute_batch(&self, calls: Vec<Call>) -> ProviderResult<TxHash> {
                let calls = calls.into_iter().map(Into::into).collect();
                let pending = self.instance.executeBatch(calls).send().await?;
                Ok(*pending.tx_hash())
            }

            #[instrument(skip_all)]
            async fn add_deposit(&self, value: U256) -> ProviderResult<TxHash> {
                let pending = self.instance.addDeposit().value(value).send().await?;
                Ok(*pending.tx_hash())
            }

            #[instrument(skip_all)]
            async fn withdraw_deposit_to(
                &self,
                to: Address,
                amount: U256,
            ) -> ProviderResult<TxHash> {
                let pending = self
                    .instance
                    .withdrawDepositTo(to, amount)
                    .send()
                    .await?;
                Ok(*pending.tx_hash())
            }
        }
    };
}

impl_smart_account!(AlloyAccount, AAccount, ContractKind::AAccount);
impl_smart_account!(AlloyWallet, AAWallet, ContractKind::AAWallet);

#[cfg(test)]
mod tests {
    use aakit_contracts::v0_7::Call as SolCallStruct;
    use aakit_types::{UserOperationBuilder, UserOperationRequiredFields};
    use alloy_primitives::{address, b256, bytes, hex};
    use alloy_provider::ProviderBuilder;
    use alloy_sol_types::SolValue;
    use alloy_transport::mock::Asserter;

    use super::*;

    const ACCOUNT: Address = address!("00000000000000000000000000000000000a11ce");

    fn account() -> (AlloyAccount<impl AlloyProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::default().connect_mocked_client(asserter.clone());
        (AlloyAccount::new(ACCOUNT, provider), asserter)
    }

    fn wallet() -> (AlloyWallet<impl AlloyProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::default().connect_mocked_client(asserter.clone());
        (AlloyWallet::new(ACCOUNT, provider), asserter)
    }

    fn encoded<T: SolValue>(value: T) -> Bytes {
        value.abi_encode().into()
    }

    #[tokio::test]
    async fn test_view_calls() {
        let (account, asserter) = account();
        let owner = Address::random();
        asserter.push_success(&encoded(owner));
        asserter.push_success(&encoded(U256::from(5)));

        assert_eq!(account.owner().await.unwrap(), owner);
        assert_eq!(account.get_nonce().await.unwrap(), U256::from(5));
        assert_eq!(SmartAccount::address(&account), ACCOUNT);
        assert_eq!(account.kind(), ContractKind::AAccount);
    }

    #[tokio::test]
    async fn test_is_valid_signature() {
        let (wallet, asserter) = wallet();
        asserter.push_success(&encoded(ERC1271_MAGIC_VALUE));
        asserter.push_success(&encoded(FixedBytes::<4>::from([0xff; 4])));

        let hash = B256::random();
        assert!(wallet
            .is_valid_signature(hash, bytes!("01"))
            .await
            .unwrap());
        assert!(!wallet
            .is_valid_signature(hash, bytes!("01"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_execute_returns_tx_hash() {
        let (account, asserter) = account();
        let tx_hash = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        asserter.push_success(&tx_hash);

        let call = Call::new(Address::random(), U256::from(1), bytes!("c0ffee"));
        assert_eq!(account.execute(call).await.unwrap(), tx_hash);
    }

    #[tokio::test]
    async fn test_initialize_and_supports_interface() {
        let (account, asserter) = account();
        let tx_hash = b256!("00000000000000000000000000000000000000000000000000000000000000bb");
        asserter.push_success(&tx_hash);
        asserter.push_success(&encoded(true));
        asserter.push_success(&encoded(false));

        assert_eq!(account.initialize(Address::random()).await.unwrap(), tx_hash);
        assert!(account
            .supports_interface(FixedBytes::from(hex!("01ffc9a7")))
            .await
            .unwrap());
        assert!(!account
            .supports_interface(FixedBytes::from(hex!("ffffffff")))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_transfer_ownership() {
        let (wallet, asserter) = wallet();
        let tx_hash = b256!("00000000000000000000000000000000000000000000000000000000000000cc");
        asserter.push_success(&tx_hash);

        assert_eq!(
            wallet.transfer_ownership(Address::random()).await.unwrap(),
            tx_hash
        );
    }

    #[tokio::test]
    async fn test_simulate_validate_user_op() {
        let (account, asserter) = account();
        let entry_point = address!("0000000071727de22e5e9d8baf0edac6f37da032");
        asserter.push_success(&encoded(entry_point));
        asserter.push_success(&encoded(U256::from(1)));

        let user_op = UserOperationBuilder::new(UserOperationRequiredFields {
            sender: ACCOUNT,
            ..Default::default()
        })
        .build();
        let validation = account
            .simulate_validate_user_op(user_op, B256::ZERO, U256::ZERO)
            .await
            .unwrap();
        assert!(!validation.signature_valid());
    }

    #[test]
    fn test_execute_call_data() {
        let (account, _) = account();
        let (wallet, _) = wallet();
        let call = Call::new(Address::random(), U256::from(7), bytes!("abcdef"));

        let data = account.execute_call_data(call.clone());
        assert_eq!(data[..4], hex!("b61d27f6"));
        assert_eq!(wallet.execute_call_data(call.clone()), data);

        let decoded = AAccount::executeCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.dest, call.target);
        assert_eq!(decoded.value, call.value);
        assert_eq!(decoded.func, call.data);
    }

    #[test]
    fn test_execute_batch_call_data() {
        let (wallet, _) = wallet();
        let calls = vec![
            Call::new(Address::random(), U256::ZERO, Bytes::new()),
            Call::new(Address::random(), U256::from(2), bytes!("01")),
        ];

        let data = wallet.execute_batch_call_data(calls.clone());
        let decoded = AAWallet::executeBatchCall::abi_decode(&data).unwrap();
        let expected: Vec<SolCallStruct> = calls.into_iter().map(Into::into).collect();
        assert_eq!(decoded.calls, expected);
    }
}
