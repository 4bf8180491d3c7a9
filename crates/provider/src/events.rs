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

//! Filtering and watching contract events

use std::{sync::Arc, time::Duration};

use aakit_contracts::v0_7::EventTopics;
use aakit_types::ContractEvent;
use aakit_utils::retry::{with_retries, RetryOpts};
use alloy_primitives::Address;
use alloy_rpc_types_eth::{Filter, Log};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time,
};
use tracing::{debug, info, warn};

use crate::{EvmProvider, ProviderError, ProviderResult};

/// Settings for a [`LogWatcher`]
#[derive(Debug, Clone, Copy)]
pub struct LogWatcherSettings {
    /// How often a watch polls for new blocks
    pub poll_interval: Duration,
    /// Maximum number of blocks requested by a single `eth_getLogs`
    pub max_block_range: u64,
    /// Retry settings for each RPC request
    pub retry: RetryOpts,
}

impl Default for LogWatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_block_range: 2000,
            retry: RetryOpts::default(),
        }
    }
}

/// Fetches and follows the events emitted by one of the bound contracts
#[derive(Debug)]
pub struct LogWatcher<P> {
    provider: Arc<P>,
    settings: LogWatcherSettings,
}

impl<P> Clone for LogWatcher<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            settings: self.settings,
        }
    }
}

impl<P: EvmProvider + 'static> LogWatcher<P> {
    /// Create a new watcher
    pub fn new(provider: P, settings: LogWatcherSettings) -> Self {
        Self {
            provider: Arc::new(provider),
            settings,
        }
    }

    /// All events of `E` emitted by `address` in `[from_block, to_block]`, in log order
    pub async fn query<E: EventTopics>(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> ProviderResult<Vec<ContractEvent<E>>> {
        let mut events = vec![];
        if from_block > to_block {
            return Ok(events);
        }

        let range = self.settings.max_block_range.max(1);
        let mut start = from_block;
        loop {
            let end = to_block.min(start.saturating_add(range - 1));
            let filter = Filter::new()
                .address(address)
                .event_signature(E::topics())
                .from_block(start)
                .to_block(end);
            let logs = with_retries(
                "fetch contract logs",
                || self.provider.get_logs(&filter),
                self.settings.retry,
            )
            .await?;
            debug!("Fetched {} {} logs in blocks {start}..={end}", logs.len(), E::NAME);
            events.extend(logs.iter().filter_map(decode_log::<E>));

            if end >= to_block {
                return Ok(events);
            }
            start = end + 1;
        }
    }

    /// Forward every new event of `E` emitted by `address` into `sink`
    ///
    /// Watching starts at `from_block`, or at the block after the current head
    /// when none is given. The returned [`Subscription`] stops the watch when
    /// dropped or unsubscribed.
    pub async fn watch<E>(
        &self,
        address: Address,
        from_block: Option<u64>,
        sink: mpsc::Sender<ContractEvent<E>>,
    ) -> ProviderResult<Subscription>
    where
        E: EventTopics + Send + 'static,
    {
        let next_block = match from_block {
            Some(block) => block,
            None => self.provider.get_block_number().await? + 1,
        };
        info!("Watching {} events of {address:?} from block {next_block}", E::NAME);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let watcher = self.clone();
        let handle = tokio::spawn(async move {
            watcher
                .follow::<E>(address, next_block, sink, shutdown_rx)
                .await
        });

        Ok(Subscription {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    async fn follow<E: EventTopics>(
        self,
        address: Address,
        mut next_block: u64,
        sink: mpsc::Sender<ContractEvent<E>>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> ProviderResult<()> {
        loop {
            let head = tokio::select! {
                _ = &mut shutdown => return Ok(()),
                _ = sink.closed() => return Ok(()),
                head = with_retries(
                    "fetch block number",
                    || self.provider.get_block_number(),
                    self.settings.retry,
                ) => head?,
            };

            if head >= next_block {
                let events = tokio::select! {
                    _ = &mut shutdown => return Ok(()),
                    events = self.query::<E>(address, next_block, head) => events?,
                };
                for event in events {
                    // a full channel must not block shutdown
                    let sent = tokio::select! {
                        _ = &mut shutdown => return Ok(()),
                        sent = sink.send(event) => sent,
                    };
                    if sent.is_err() {
                        debug!("Event receiver dropped, stopping {} watch", E::NAME);
                        return Ok(());
                    }
                }
                next_block = head + 1;
            }

            tokio::select! {
                _ = &mut shutdown => return Ok(()),
                _ = sink.closed() => return Ok(()),
                _ = time::sleep(self.settings.poll_interval) => {}
            }
        }
    }
}

fn decode_log<E: EventTopics>(log: &Log) -> Option<ContractEvent<E>> {
    match E::decode_raw_log(log.topics(), &log.data().data) {
        Ok(event) => Some(ContractEvent {
            event,
            address: log.address(),
            block_number: log.block_number,
            block_hash: log.block_hash,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
        }),
        Err(err) => {
            warn!(
                "Skipping undecodable {} log in tx {:?}: {err}",
                E::NAME,
                log.transaction_hash
            );
            None
        }
    }
}

/// Handle to a running watch
///
/// Dropping the subscription stops the watch.
#[derive(Debug)]
pub struct Subscription {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<ProviderResult<()>>>,
}

impl Subscription {
    /// Stop the watch and wait for it to exit
    ///
    /// Returns the error that ended the watch early, if any.
    pub async fn unsubscribe(mut self) -> ProviderResult<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|err| ProviderError::Other(err.into()))?,
            None => Ok(()),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use aakit_contracts::v0_7::AccountManager::{AccountCreated, AccountManagerEvents};
    use alloy_primitives::{address, LogData, B256, U256};
    use alloy_sol_types::SolEvent;

    use super::*;
    use crate::MockEvmProvider;

    const FACTORY: Address = address!("00000000000000000000000000000000000fac70");

    fn settings() -> LogWatcherSettings {
        LogWatcherSettings {
            poll_interval: Duration::from_millis(100),
            max_block_range: 10,
            retry: RetryOpts {
                max_attempts: 2,
                min_nonzero_wait: Duration::from_millis(10),
                max_wait: Duration::from_millis(10),
                max_jitter: Duration::ZERO,
            },
        }
    }

    fn created_log(block_number: u64) -> Log {
        let event = AccountCreated {
            account: Address::random(),
            owner: Address::random(),
            salt: U256::from(block_number),
        };
        Log {
            inner: alloy_primitives::Log {
                address: FACTORY,
                data: event.encode_log_data(),
            },
            block_number: Some(block_number),
            log_index: Some(0),
            ..Default::default()
        }
    }

    fn salt(event: &ContractEvent<AccountManagerEvents>) -> U256 {
        match &event.event {
            AccountManagerEvents::AccountCreated(created) => created.salt,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_chunks_block_range() {
        let mut provider = MockEvmProvider::default();
        provider
            .expect_get_logs()
            .times(3)
            .returning(|filter| {
                let from = filter.get_from_block().unwrap();
                let to = filter.get_to_block().unwrap();
                assert!(to - from < 10);
                Ok(vec![created_log(from)])
            });

        let watcher = LogWatcher::new(provider, settings());
        let events = watcher
            .query::<AccountManagerEvents>(FACTORY, 0, 25)
            .await
            .unwrap();

        let salts = events.iter().map(salt).collect::<Vec<_>>();
        assert_eq!(salts, vec![U256::from(0), U256::from(10), U256::from(20)]);
        assert_eq!(events[1].block_number, Some(10));
        assert_eq!(events[1].address, FACTORY);
    }

    #[tokio::test]
    async fn test_query_skips_undecodable_logs() {
        let mut provider = MockEvmProvider::default();
        provider.expect_get_logs().returning(|_| {
            let mut bad = created_log(1);
            bad.inner.data = LogData::new_unchecked(vec![B256::ZERO], Default::default());
            Ok(vec![bad, created_log(2)])
        });

        let watcher = LogWatcher::new(provider, settings());
        let events = watcher
            .query::<AccountManagerEvents>(FACTORY, 1, 2)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_number, Some(2));
    }

    #[tokio::test]
    async fn test_query_empty_range() {
        let provider = MockEvmProvider::default();
        let watcher = LogWatcher::new(provider, settings());
        let events = watcher
            .query::<AccountManagerEvents>(FACTORY, 5, 4)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_query_retries_then_fails() {
        let mut provider = MockEvmProvider::default();
        provider
            .expect_get_logs()
            .times(2)
            .returning(|_| Err(ProviderError::Other(anyhow::anyhow!("boom"))));

        let watcher = LogWatcher::new(provider, settings());
        let res = watcher.query::<AccountManagerEvents>(FACTORY, 0, 1).await;
        assert!(matches!(res, Err(ProviderError::Other(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_starts_after_head() {
        let calls = Arc::new(AtomicU64::new(0));
        let mut provider = MockEvmProvider::default();
        let c = Arc::clone(&calls);
        provider.expect_get_block_number().returning(move || {
            // head is 7 when the watch starts, then 8
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(7)
            } else {
                Ok(8)
            }
        });
        provider.expect_get_logs().returning(|filter| {
            assert_eq!(filter.get_from_block(), Some(8));
            assert_eq!(filter.get_to_block(), Some(8));
            Ok(vec![created_log(8)])
        });

        let (tx, mut rx) = mpsc::channel(8);
        let watcher = LogWatcher::new(provider, settings());
        let subscription = watcher
            .watch::<AccountManagerEvents>(FACTORY, None, tx)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.block_number, Some(8));
        assert_eq!(salt(&event), U256::from(8));

        subscription.unsubscribe().await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_exits_on_persistent_error() {
        let mut provider = MockEvmProvider::default();
        provider
            .expect_get_block_number()
            .returning(|| Err(ProviderError::Other(anyhow::anyhow!("node down"))));

        let (tx, mut rx) = mpsc::channel::<ContractEvent<AccountManagerEvents>>(8);
        let watcher = LogWatcher::new(provider, settings());
        let subscription = watcher.watch(FACTORY, Some(1), tx).await.unwrap();

        // the task drops the sink when it exits
        assert!(rx.recv().await.is_none());
        assert!(subscription.unsubscribe().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_stops_when_receiver_dropped() {
        let provider_alive = Arc::new(());
        let alive = Arc::clone(&provider_alive);
        let mut provider = MockEvmProvider::default();
        provider.expect_get_block_number().returning(move || {
            let _held = &alive;
            Ok(3)
        });
        provider.expect_get_logs().returning(|_| Ok(vec![]));

        let (tx, rx) = mpsc::channel::<ContractEvent<AccountManagerEvents>>(8);
        let watcher = LogWatcher::new(provider, settings());
        let subscription = watcher.watch(FACTORY, Some(1), tx).await.unwrap();
        drop(watcher);

        drop(rx);
        // the provider is released once the task exits
        time::timeout(Duration::from_secs(5), async {
            while Arc::strong_count(&provider_alive) > 1 {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("watch kept running after the receiver was dropped");

        subscription.unsubscribe().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_subscription_stops_watch() {
        let mut provider = MockEvmProvider::default();
        provider.expect_get_block_number().returning(|| Ok(3));
        provider.expect_get_logs().returning(|_| Ok(vec![]));

        let (tx, mut rx) = mpsc::channel::<ContractEvent<AccountManagerEvents>>(8);
        let watcher = LogWatcher::new(provider, settings());
        let subscription = watcher.watch(FACTORY, Some(1), tx).await.unwrap();

        drop(subscription);
        // the task drops the sink when it exits
        let closed = time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(closed, Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_with_full_channel() {
        let mut provider = MockEvmProvider::default();
        provider.expect_get_block_number().returning(|| Ok(5));
        provider
            .expect_get_logs()
            .returning(|_| Ok((1..=4).map(created_log).collect()));

        // nothing reads the receiver, so the second send blocks
        let (tx, _rx) = mpsc::channel::<ContractEvent<AccountManagerEvents>>(1);
        let watcher = LogWatcher::new(provider, settings());
        let subscription = watcher.watch(FACTORY, Some(1), tx).await.unwrap();
        time::sleep(Duration::from_millis(50)).await;

        let res = time::timeout(Duration::from_secs(3), subscription.unsubscribe())
            .await
            .expect("unsubscribe blocked on a full channel");
        assert!(res.is_ok());
    }
}
