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

use std::time::Duration;

use alloy_network::EthereumWallet;
use alloy_provider::{DynProvider, Provider as _, ProviderBuilder};
use alloy_rpc_client::ClientBuilder;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::layers::RetryBackoffLayer;
use anyhow::Context;
use url::Url;

use self::{
    evm::AlloyEvmProvider, metrics::AlloyMetricLayer, provider_timeout::ProviderTimeoutLayer,
};

pub(crate) mod account;
pub(crate) mod account_manager;
pub(crate) mod evm;
mod metrics;
mod provider_timeout;

/// Create a new alloy evm provider from a given RPC URL
pub fn new_alloy_evm_provider(
    rpc_url: &str,
    provider_client_timeout_seconds: u64,
) -> anyhow::Result<AlloyEvmProvider<DynProvider>> {
    let provider = new_alloy_provider(rpc_url, provider_client_timeout_seconds, None)?;
    Ok(AlloyEvmProvider::new(provider))
}

/// Create a new alloy provider from a given RPC URL
///
/// With a `signer` transactions are signed locally and sent raw, otherwise
/// they are sent with `eth_sendTransaction` for the node to sign.
pub fn new_alloy_provider(
    rpc_url: &str,
    provider_client_timeout_seconds: u64,
    signer: Option<PrivateKeySigner>,
) -> anyhow::Result<DynProvider> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    let metric_layer = AlloyMetricLayer::default();
    // TODO: expose rate limit retries and compute units per second as options
    let retry_layer = RetryBackoffLayer::new(10, 500, 1_000_000);
    let timeout_layer =
        ProviderTimeoutLayer::new(Duration::from_secs(provider_client_timeout_seconds));
    let client = ClientBuilder::default()
        .layer(retry_layer)
        .layer(metric_layer)
        .layer(timeout_layer)
        .http(url);

    let provider = match signer {
        Some(signer) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased(),
        None => ProviderBuilder::new().connect_client(client).erased(),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let err = new_alloy_provider("not a url", 10, None).unwrap_err();
        assert!(err.to_string().contains("invalid rpc url"));
    }

    #[tokio::test]
    async fn test_builds_without_connecting() {
        let signer: PrivateKeySigner =
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
                .parse()
                .unwrap();
        assert!(new_alloy_provider("http://localhost:8545", 10, Some(signer)).is_ok());
        assert!(new_alloy_evm_provider("http://localhost:8545", 10).is_ok());
    }
}
