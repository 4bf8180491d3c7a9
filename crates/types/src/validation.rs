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

use alloy_primitives::{address, Address, U256};

/// Aggregator value marking a failed signature check
pub const SIG_VALIDATION_FAILED: Address = address!("0000000000000000000000000000000000000001");

/// Validation data returned by an account's `validateUserOp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationData {
    aggregator: Address,
    valid_after: u64,
    valid_until: u64,
}

impl ValidationData {
    /// Whether the signature is valid
    pub fn signature_valid(&self) -> bool {
        self.aggregator != SIG_VALIDATION_FAILED
    }

    /// The aggregator address, if any
    pub fn aggregator(&self) -> Option<Address> {
        if self.aggregator == SIG_VALIDATION_FAILED || self.aggregator.is_zero() {
            None
        } else {
            Some(self.aggregator)
        }
    }

    /// First timestamp the operation is valid at
    pub fn valid_after(&self) -> u64 {
        self.valid_after
    }

    /// Last timestamp the operation is valid at. `u64::MAX` when unbounded.
    pub fn valid_until(&self) -> u64 {
        self.valid_until
    }
}

/// Parse the packed validation data returned by `validateUserOp`
///
/// Layout: `validAfter (6 bytes) | validUntil (6 bytes) | aggregator (20 bytes)`.
/// A zero `validUntil` is converted to `u64::MAX`.
pub fn parse_validation_data(data: U256) -> ValidationData {
    let slice: [u8; 32] = data.to_be_bytes();
    let aggregator = Address::from_slice(&slice[12..]);

    let mut buf = [0; 8];
    buf[2..8].copy_from_slice(&slice[6..12]);
    let mut valid_until = u64::from_be_bytes(buf);
    if valid_until == 0 {
        valid_until = u64::MAX;
    }

    let mut buf = [0; 8];
    buf[2..8].copy_from_slice(&slice[..6]);
    let valid_after = u64::from_be_bytes(buf);

    ValidationData {
        aggregator,
        valid_after,
        valid_until,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_valid_forever() {
        let data = parse_validation_data(U256::ZERO);
        assert!(data.signature_valid());
        assert_eq!(data.aggregator(), None);
        assert_eq!(data.valid_after(), 0);
        assert_eq!(data.valid_until(), u64::MAX);
    }

    #[test]
    fn test_sig_failed() {
        let data = parse_validation_data(U256::from(1));
        assert!(!data.signature_valid());
        assert_eq!(data.aggregator(), None);
    }

    #[test]
    fn test_time_range_and_aggregator() {
        let aggregator = address!("00000000000000000000000000000000000000aa");
        let packed = (U256::from(100_u64) << 208)
            | (U256::from(200_u64) << 160)
            | U256::from_be_slice(aggregator.as_slice());
        let data = parse_validation_data(packed);
        assert_eq!(data.valid_after(), 100);
        assert_eq!(data.valid_until(), 200);
        assert_eq!(data.aggregator(), Some(aggregator));
        assert!(data.signature_valid());
    }
}
