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

use aakit_contracts::v0_7::PackedUserOperation;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

const ADDRESS_LEN: usize = 20;
const GAS_LEN: usize = 16;
const PAYMASTER_PREFIX_LEN: usize = ADDRESS_LEN + 2 * GAS_LEN;

/// Unique identifier for a user operation from a given sender
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct UserOperationId {
    /// sender of user operation
    pub sender: Address,
    /// nonce of user operation
    pub nonce: U256,
}

/// Error unpacking a user operation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UserOperationError {
    /// `initCode` is non-empty but shorter than a factory address
    #[error("init code too short: {0} bytes")]
    InitCodeTooShort(usize),
    /// `paymasterAndData` is non-empty but shorter than its fixed prefix
    #[error("paymaster and data too short: {0} bytes")]
    PaymasterAndDataTooShort(usize),
}

/// User Operation
///
/// Offchain version, must be packed before sending onchain
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// Account sending the operation
    pub sender: Address,
    /// Account nonce
    pub nonce: U256,
    /// Factory deploying the account, if it is not deployed yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    /// Data passed to the factory
    #[serde(default)]
    pub factory_data: Bytes,
    /// Data the account executes
    pub call_data: Bytes,
    /// Gas limit of the execution phase
    #[serde(with = "alloy_serde::quantity")]
    pub call_gas_limit: u128,
    /// Gas limit of the verification phase
    #[serde(with = "alloy_serde::quantity")]
    pub verification_gas_limit: u128,
    /// Gas paid for the operation outside of the two phases
    pub pre_verification_gas: U256,
    /// EIP-1559 priority fee
    #[serde(with = "alloy_serde::quantity")]
    pub max_priority_fee_per_gas: u128,
    /// EIP-1559 max fee
    #[serde(with = "alloy_serde::quantity")]
    pub max_fee_per_gas: u128,
    /// Paymaster sponsoring the operation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    /// Gas limit of the paymaster verification
    #[serde(default, with = "alloy_serde::quantity")]
    pub paymaster_verification_gas_limit: u128,
    /// Gas limit of the paymaster post-op
    #[serde(default, with = "alloy_serde::quantity")]
    pub paymaster_post_op_gas_limit: u128,
    /// Data passed to the paymaster
    #[serde(default)]
    pub paymaster_data: Bytes,
    /// Signature checked by the account
    pub signature: Bytes,
}

impl UserOperation {
    /// Hash of the operation as computed by the entry point
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        hash_packed_user_operation(&self.pack(), entry_point, chain_id)
    }

    /// Identifier of the operation
    pub fn id(&self) -> UserOperationId {
        UserOperationId {
            sender: self.sender,
            nonce: self.nonce,
        }
    }

    /// Maximum cost of the operation in wei
    pub fn max_gas_cost(&self) -> U256 {
        U256::from(self.max_fee_per_gas)
            * (self.pre_verification_gas
                + U256::from(self.call_gas_limit)
                + U256::from(self.verification_gas_limit)
                + U256::from(self.paymaster_verification_gas_limit)
                + U256::from(self.paymaster_post_op_gas_limit))
    }

    /// Pack the operation into its onchain form
    pub fn pack(&self) -> PackedUserOperation {
        let init_code = match self.factory {
            Some(factory) => [factory.as_slice(), &self.factory_data[..]].concat().into(),
            None => Bytes::new(),
        };

        let paymaster_and_data = match self.paymaster {
            Some(paymaster) => [
                paymaster.as_slice(),
                &self.paymaster_verification_gas_limit.to_be_bytes()[..],
                &self.paymaster_post_op_gas_limit.to_be_bytes()[..],
                &self.paymaster_data[..],
            ]
            .concat()
            .into(),
            None => Bytes::new(),
        };

        PackedUserOperation {
            sender: self.sender,
            nonce: self.nonce,
            initCode: init_code,
            callData: self.call_data.clone(),
            accountGasLimits: concat_128(self.verification_gas_limit, self.call_gas_limit),
            preVerificationGas: self.pre_verification_gas,
            gasFees: concat_128(self.max_priority_fee_per_gas, self.max_fee_per_gas),
            paymasterAndData: paymaster_and_data,
            signature: self.signature.clone(),
        }
    }

    /// Unpack an onchain operation
    pub fn unpack(packed: PackedUserOperation) -> Result<Self, UserOperationError> {
        let (factory, factory_data) = if packed.initCode.is_empty() {
            (None, Bytes::new())
        } else if packed.initCode.len() < ADDRESS_LEN {
            return Err(UserOperationError::InitCodeTooShort(packed.initCode.len()));
        } else {
            (
                Some(Address::from_slice(&packed.initCode[..ADDRESS_LEN])),
                Bytes::copy_from_slice(&packed.initCode[ADDRESS_LEN..]),
            )
        };

        let (verification_gas_limit, call_gas_limit) = split_128(packed.accountGasLimits);
        let (max_priority_fee_per_gas, max_fee_per_gas) = split_128(packed.gasFees);

        let pm = &packed.paymasterAndData;
        let (paymaster, paymaster_verification_gas_limit, paymaster_post_op_gas_limit, paymaster_data) =
            if pm.is_empty() {
                (None, 0, 0, Bytes::new())
            } else if pm.len() < PAYMASTER_PREFIX_LEN {
                return Err(UserOperationError::PaymasterAndDataTooShort(pm.len()));
            } else {
                (
                    Some(Address::from_slice(&pm[..ADDRESS_LEN])),
                    u128_from_slice(&pm[ADDRESS_LEN..ADDRESS_LEN + GAS_LEN]),
                    u128_from_slice(&pm[ADDRESS_LEN + GAS_LEN..PAYMASTER_PREFIX_LEN]),
                    Bytes::copy_from_slice(&pm[PAYMASTER_PREFIX_LEN..]),
                )
            };

        Ok(UserOperation {
            sender: packed.sender,
            nonce: packed.nonce,
            factory,
            factory_data,
            call_data: packed.callData,
            call_gas_limit,
            verification_gas_limit,
            pre_verification_gas: packed.preVerificationGas,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            paymaster,
            paymaster_verification_gas_limit,
            paymaster_post_op_gas_limit,
            paymaster_data,
            signature: packed.signature,
        })
    }
}

impl From<UserOperation> for PackedUserOperation {
    fn from(op: UserOperation) -> Self {
        op.pack()
    }
}

impl TryFrom<PackedUserOperation> for UserOperation {
    type Error = UserOperationError;

    fn try_from(packed: PackedUserOperation) -> Result<Self, Self::Error> {
        UserOperation::unpack(packed)
    }
}

/// Required fields of a user operation
#[derive(Debug, Clone, Default)]
pub struct UserOperationRequiredFields {
    /// Account sending the operation
    pub sender: Address,
    /// Account nonce
    pub nonce: U256,
    /// Data the account executes
    pub call_data: Bytes,
    /// Gas limit of the execution phase
    pub call_gas_limit: u128,
    /// Gas limit of the verification phase
    pub verification_gas_limit: u128,
    /// Gas paid outside of the two phases
    pub pre_verification_gas: U256,
    /// EIP-1559 priority fee
    pub max_priority_fee_per_gas: u128,
    /// EIP-1559 max fee
    pub max_fee_per_gas: u128,
    /// Signature checked by the account
    pub signature: Bytes,
}

/// Builder for [`UserOperation`]
#[derive(Debug, Clone)]
pub struct UserOperationBuilder {
    required: UserOperationRequiredFields,
    factory: Option<Address>,
    factory_data: Bytes,
    paymaster: Option<Address>,
    paymaster_verification_gas_limit: u128,
    paymaster_post_op_gas_limit: u128,
    paymaster_data: Bytes,
}

impl UserOperationBuilder {
    /// Start building from the required fields
    pub fn new(required: UserOperationRequiredFields) -> Self {
        Self {
            required,
            factory: None,
            factory_data: Bytes::new(),
            paymaster: None,
            paymaster_verification_gas_limit: 0,
            paymaster_post_op_gas_limit: 0,
            paymaster_data: Bytes::new(),
        }
    }

    /// Deploy the sender with `factory` called with `factory_data`
    pub fn factory(mut self, factory: Address, factory_data: Bytes) -> Self {
        self.factory = Some(factory);
        self.factory_data = factory_data;
        self
    }

    /// Sponsor the operation with `paymaster`
    pub fn paymaster(
        mut self,
        paymaster: Address,
        paymaster_verification_gas_limit: u128,
        paymaster_post_op_gas_limit: u128,
        paymaster_data: Bytes,
    ) -> Self {
        self.paymaster = Some(paymaster);
        self.paymaster_verification_gas_limit = paymaster_verification_gas_limit;
        self.paymaster_post_op_gas_limit = paymaster_post_op_gas_limit;
        self.paymaster_data = paymaster_data;
        self
    }

    /// Build the operation
    pub fn build(self) -> UserOperation {
        UserOperation {
            sender: self.required.sender,
            nonce: self.required.nonce,
            factory: self.factory,
            factory_data: self.factory_data,
            call_data: self.required.call_data,
            call_gas_limit: self.required.call_gas_limit,
            verification_gas_limit: self.required.verification_gas_limit,
            pre_verification_gas: self.required.pre_verification_gas,
            max_priority_fee_per_gas: self.required.max_priority_fee_per_gas,
            max_fee_per_gas: self.required.max_fee_per_gas,
            paymaster: self.paymaster,
            paymaster_verification_gas_limit: self.paymaster_verification_gas_limit,
            paymaster_post_op_gas_limit: self.paymaster_post_op_gas_limit,
            paymaster_data: self.paymaster_data,
            signature: self.required.signature,
        }
    }
}

fn hash_packed_user_operation(
    puo: &PackedUserOperation,
    entry_point: Address,
    chain_id: u64,
) -> B256 {
    let encoded = (
        puo.sender,
        puo.nonce,
        keccak256(&puo.initCode),
        keccak256(&puo.callData),
        puo.accountGasLimits,
        puo.preVerificationGas,
        puo.gasFees,
        keccak256(&puo.paymasterAndData),
    )
        .abi_encode();

    keccak256((keccak256(encoded), entry_point, U256::from(chain_id)).abi_encode())
}

fn concat_128(high: u128, low: u128) -> B256 {
    let mut out = [0_u8; 32];
    out[..GAS_LEN].copy_from_slice(&high.to_be_bytes());
    out[GAS_LEN..].copy_from_slice(&low.to_be_bytes());
    B256::from(out)
}

fn split_128(word: B256) -> (u128, u128) {
    (
        u128_from_slice(&word[..GAS_LEN]),
        u128_from_slice(&word[GAS_LEN..]),
    )
}

fn u128_from_slice(slice: &[u8]) -> u128 {
    let mut buf = [0_u8; GAS_LEN];
    buf.copy_from_slice(slice);
    u128::from_be_bytes(buf)
}
