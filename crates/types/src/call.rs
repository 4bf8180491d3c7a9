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

use std::{fmt::Display, str::FromStr};

use aakit_contracts::v0_7::Call as SolCall;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call made by an account, either alone or as part of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Address the account calls
    pub target: Address,
    /// Wei sent along with the call
    pub value: U256,
    /// Call data
    pub data: Bytes,
}

impl Call {
    /// Create a new call
    pub fn new(target: Address, value: U256, data: Bytes) -> Self {
        Self {
            target,
            value,
            data,
        }
    }
}

impl From<Call> for SolCall {
    fn from(call: Call) -> Self {
        SolCall {
            target: call.target,
            value: call.value,
            data: call.data,
        }
    }
}

impl From<SolCall> for Call {
    fn from(call: SolCall) -> Self {
        Call {
            target: call.target,
            value: call.value,
            data: call.data,
        }
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.target, self.value, self.data)
    }
}

/// Error parsing a call from its `target[:value[:data]]` string form
#[derive(Debug, thiserror::Error)]
pub enum ParseCallError {
    /// Target address is malformed
    #[error("invalid call target: {0}")]
    Target(String),
    /// Value is not a decimal or hex integer
    #[error("invalid call value: {0}")]
    Value(String),
    /// Data is not hex
    #[error("invalid call data: {0}")]
    Data(String),
    /// Too many segments
    #[error("expected target[:value[:data]], got {0}")]
    Format(String),
}

impl FromStr for Call {
    type Err = ParseCallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(':').collect::<Vec<_>>();
        if parts.is_empty() || parts.len() > 3 {
            return Err(ParseCallError::Format(s.to_string()));
        }

        let target = parts[0]
            .parse::<Address>()
            .map_err(|_| ParseCallError::Target(parts[0].to_string()))?;
        let value = match parts.get(1) {
            Some(v) if !v.is_empty() => {
                U256::from_str(v).map_err(|_| ParseCallError::Value(v.to_string()))?
            }
            _ => U256::ZERO,
        };
        let data = match parts.get(2) {
            Some(d) if !d.is_empty() => d
                .parse::<Bytes>()
                .map_err(|_| ParseCallError::Data(d.to_string()))?,
            _ => Bytes::new(),
        };

        Ok(Call::new(target, value, data))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes};

    use super::*;

    #[test]
    fn test_parse_full() {
        let call: Call = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789:1000:0xdeadbeef"
            .parse()
            .unwrap();
        assert_eq!(
            call,
            Call::new(
                address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789"),
                U256::from(1000),
                bytes!("deadbeef"),
            )
        );
    }

    #[test]
    fn test_parse_defaults() {
        let call: Call = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789"
            .parse()
            .unwrap();
        assert_eq!(call.value, U256::ZERO);
        assert!(call.data.is_empty());

        let call: Call = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789::0x01"
            .parse()
            .unwrap();
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.data, bytes!("01"));
    }

    #[test]
    fn test_parse_hex_value() {
        let call: Call = "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789:0x10"
            .parse()
            .unwrap();
        assert_eq!(call.value, U256::from(16));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "nope".parse::<Call>(),
            Err(ParseCallError::Target(_))
        ));
        assert!(matches!(
            "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789:abc".parse::<Call>(),
            Err(ParseCallError::Value(_))
        ));
        assert!(matches!(
            "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789:1:zz".parse::<Call>(),
            Err(ParseCallError::Data(_))
        ));
        assert!(matches!(
            "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789:1:0x:extra".parse::<Call>(),
            Err(ParseCallError::Format(_))
        ));
    }

    #[test]
    fn test_sol_conversion() {
        let call = Call::new(Address::random(), U256::from(7), bytes!("abcd"));
        let sol: SolCall = call.clone().into();
        assert_eq!(sol.target, call.target);
        assert_eq!(Call::from(sol), call);
    }
}
