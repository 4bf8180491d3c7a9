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

// Account contracts targeting the v0.7 entry point (PackedUserOperation).
// Must stay in sync with the JSON documents under `abi/`, see `crate::abi`.

use alloy_primitives::B256;
use alloy_sol_macro::sol;
use alloy_sol_types::{SolEvent, SolEventInterface};

sol!(
    #[allow(missing_docs)]
    #[derive(Default, Debug, PartialEq, Eq)]
    struct Call {
        address target;
        uint256 value;
        bytes data;
    }

    #[allow(missing_docs)]
    #[derive(Default, Debug, PartialEq, Eq)]
    struct PackedUserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes paymasterAndData;
        bytes signature;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Default, Debug, PartialEq, Eq)]
    interface AAccount {
        event AccountInitialized(address indexed entryPoint, address indexed owner);

        event Initialized(uint64 version);

        event Upgraded(address indexed implementation);

        function entryPoint() external view returns (address);

        function owner() external view returns (address);

        function getNonce() external view returns (uint256);

        function getDeposit() external view returns (uint256);

        function initialize(address anOwner) external;

        function execute(address dest, uint256 value, bytes calldata func) external;

        function executeBatch(Call[] calldata calls) external;

        function validateUserOp(
            PackedUserOperation calldata userOp,
            bytes32 userOpHash,
            uint256 missingAccountFunds
        ) external returns (uint256 validationData);

        function addDeposit() external payable;

        function withdrawDepositTo(address payable withdrawAddress, uint256 amount) external;

        function isValidSignature(bytes32 hash, bytes calldata signature)
            external view returns (bytes4);

        function supportsInterface(bytes4 interfaceId) external view returns (bool);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Default, Debug, PartialEq, Eq)]
    interface AAWallet {
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        event Executed(address indexed target, uint256 value, bytes data);

        event Received(address indexed sender, uint256 amount);

        function entryPoint() external view returns (address);

        function owner() external view returns (address);

        function getNonce() external view returns (uint256);

        function getDeposit() external view returns (uint256);

        function execute(address dest, uint256 value, bytes calldata func) external;

        function executeBatch(Call[] calldata calls) external;

        function validateUserOp(
            PackedUserOperation calldata userOp,
            bytes32 userOpHash,
            uint256 missingAccountFunds
        ) external returns (uint256 validationData);

        function transferOwnership(address newOwner) external;

        function addDeposit() external payable;

        function withdrawDepositTo(address payable withdrawAddress, uint256 amount) external;

        function isValidSignature(bytes32 hash, bytes calldata signature)
            external view returns (bytes4);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Default, Debug, PartialEq, Eq)]
    interface AccountManager {
        event AccountCreated(address indexed account, address indexed owner, uint256 salt);

        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function accountImplementation() external view returns (address);

        function entryPoint() external view returns (address);

        function owner() external view returns (address);

        function createAccount(address owner, uint256 salt) external returns (address ret);

        function getAddress(address owner, uint256 salt) external view returns (address);

        function isAccount(address account) external view returns (bool);

        function addStake(uint32 unstakeDelaySec) external payable;

        function unlockStake() external;

        function withdrawStake(address payable withdrawAddress) external;
    }
);

/// Event enums whose members can be matched by their `topic0`
pub trait EventTopics: SolEventInterface {
    /// Signature hashes of every event in the enum
    fn topics() -> Vec<B256>;
}

impl EventTopics for AAccount::AAccountEvents {
    fn topics() -> Vec<B256> {
        vec![
            AAccount::AccountInitialized::SIGNATURE_HASH,
            AAccount::Initialized::SIGNATURE_HASH,
            AAccount::Upgraded::SIGNATURE_HASH,
        ]
    }
}

impl EventTopics for AAWallet::AAWalletEvents {
    fn topics() -> Vec<B256> {
        vec![
            AAWallet::OwnershipTransferred::SIGNATURE_HASH,
            AAWallet::Executed::SIGNATURE_HASH,
            AAWallet::Received::SIGNATURE_HASH,
        ]
    }
}

impl EventTopics for AccountManager::AccountManagerEvents {
    fn topics() -> Vec<B256> {
        vec![
            AccountManager::AccountCreated::SIGNATURE_HASH,
            AccountManager::OwnershipTransferred::SIGNATURE_HASH,
        ]
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, U256};

    use super::*;

    fn assert_topics<E: EventTopics>() {
        let topics = E::topics();
        assert_eq!(topics.len(), E::COUNT);
        for (i, topic) in topics.iter().enumerate() {
            assert!(!topics[i + 1..].contains(topic));
        }
    }

    #[test]
    fn test_topics_cover_every_event() {
        assert_topics::<AAccount::AAccountEvents>();
        assert_topics::<AAWallet::AAWalletEvents>();
        assert_topics::<AccountManager::AccountManagerEvents>();
    }

    #[test]
    fn test_decode_account_created() {
        let event = AccountManager::AccountCreated {
            account: address!("00000000000000000000000000000000000000a1"),
            owner: address!("00000000000000000000000000000000000000b2"),
            salt: U256::from(9),
        };
        let log = event.encode_log_data();
        assert_eq!(
            log.topics()[0],
            b256!("33310a89c32d8cc00057ad6ef6274d2f8fe22389a992cf89983e09fc84f6cfff")
        );
        assert_eq!(log.topics().len(), 3);

        let decoded =
            AccountManager::AccountManagerEvents::decode_raw_log(log.topics(), &log.data)
                .unwrap();
        assert_eq!(
            decoded,
            AccountManager::AccountManagerEvents::AccountCreated(event)
        );

        let mut topics = log.topics().to_vec();
        topics[0] = B256::ZERO;
        assert!(AccountManager::AccountManagerEvents::decode_raw_log(&topics, &log.data).is_err());
    }
}
