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

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{BlockId, Filter, Log};
use tracing::instrument;

use crate::{AlloyProvider, EvmProvider, ProviderResult};

/// Evm Provider implementation using [alloy-provider](https://github.com/alloy-rs/alloy)
#[derive(Debug, Clone)]
pub struct AlloyEvmProvider<AP> {
    inner: AP,
}

impl<AP> AlloyEvmProvider<AP> {
    /// Create a new `AlloyEvmProvider`
    pub fn new(inner: AP) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<AP: AlloyProvider> EvmProvider for AlloyEvmProvider<AP> {
    #[instrument(skip_all)]
    async fn get_block_number(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_block_number().await?)
    }

    #[instrument(skip_all)]
    async fn get_chain_id(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_chain_id().await?)
    }

    #[instrument(skip_all)]
    async fn get_balance(&self, address: Address, block: Option<BlockId>) -> ProviderResult<U256> {
        let mut call = self.inner.get_balance(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    #[instrument(skip_all)]
    async fn get_code(&self, address: Address, block: Option<BlockId>) -> ProviderResult<Bytes> {
        let mut call = self.inner.get_code_at(address);
        if let Some(block) = block {
            call = call.block_id(block);
        }

        Ok(call.await?)
    }

    #[instrument(skip_all)]
    async fn get_logs(&self, filter: &Filter) -> ProviderResult<Vec<Log>> {
        Ok(self.inner.get_logs(filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use alloy_provider::ProviderBuilder;
    use alloy_transport::mock::Asserter;

    use super::*;
    use crate::ProviderError;

    fn provider() -> (AlloyEvmProvider<impl AlloyProvider>, Asserter) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::default().connect_mocked_client(asserter.clone());
        (AlloyEvmProvider::new(provider), asserter)
    }

    #[tokio::test]
    async fn test_block_number_and_chain_id() {
        let (provider, asserter) = provider();
        asserter.push_success(&"0x10");
        asserter.push_success(&"0x1");

        assert_eq!(provider.get_block_number().await.unwrap(), 16);
        assert_eq!(provider.get_chain_id().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rpc_error_is_passed_through() {
        let (provider, asserter) = provider();
        asserter.push_failure_msg("header not found");

        let err = provider.get_block_number().await.unwrap_err();
        assert!(matches!(err, ProviderError::RPC(_)));
        assert!(err.to_string().contains("header not found"));
    }
}
