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

use aakit_provider::PrivateKeySigner;
use anyhow::Context;
use clap::Args;

#[derive(Args, Debug)]
#[command(next_help_heading = "SIGNER")]
pub struct SignerArgs {
    /// Private key used to sign transactions
    ///
    /// If not provided, transactions are sent with `eth_sendTransaction` for
    /// the node to sign
    #[arg(
        long = "signer.private_key",
        name = "signer.private_key",
        env = "SIGNER_PRIVATE_KEY",
        global = true
    )]
    pub private_key: Option<String>,
}

impl SignerArgs {
    /// The local signer, if a private key was given
    pub fn signer(&self) -> anyhow::Result<Option<PrivateKeySigner>> {
        self.private_key
            .as_deref()
            .map(|key| {
                key.parse::<PrivateKeySigner>()
                    .context("signer.private_key should be a hex encoded private key")
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer() {
        let args = SignerArgs { private_key: None };
        assert!(args.signer().unwrap().is_none());

        let args = SignerArgs {
            private_key: Some(
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
            ),
        };
        let signer = args.signer().unwrap().unwrap();
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let args = SignerArgs {
            private_key: Some("0x1234".to_string()),
        };
        assert!(args.signer().is_err());
    }
}
