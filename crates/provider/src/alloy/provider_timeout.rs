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

//! Middleware that applies a client-side timeout to RPC requests.
//!
//! If the response does not complete within the timeout, the request is
//! abandoned and a local usage error is returned.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use pin_project::pin_project;
use tokio::time::Sleep;
use tower::{Layer, Service};

/// Layer producing [`ProviderTimeout`] services
#[derive(Debug, Clone)]
pub(crate) struct ProviderTimeoutLayer {
    timeout: Duration,
}

impl ProviderTimeoutLayer {
    pub(crate) fn new(timeout: Duration) -> Self {
        ProviderTimeoutLayer { timeout }
    }
}

impl<S> Layer<S> for ProviderTimeoutLayer
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError> + Sync,
{
    type Service = ProviderTimeout<S>;

    fn layer(&self, service: S) -> Self::Service {
        ProviderTimeout {
            service,
            timeout: self.timeout,
        }
    }
}

/// Applies a timeout to every request sent through the inner service
#[derive(Debug, Clone)]
pub(crate) struct ProviderTimeout<S> {
    service: S,
    timeout: Duration,
}

impl<S> Service<RequestPacket> for ProviderTimeout<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Sync
        + Send
        + Clone
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TimeoutFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        TimeoutFuture {
            response: self.service.call(request),
            sleep: tokio::time::sleep(self.timeout),
        }
    }
}

/// Response future of [`ProviderTimeout`]
#[pin_project]
#[derive(Debug)]
pub(crate) struct TimeoutFuture<F> {
    #[pin]
    response: F,
    #[pin]
    sleep: Sleep,
}

impl<F> Future for TimeoutFuture<F>
where
    F: Future<Output = Result<ResponsePacket, TransportError>>,
{
    type Output = Result<ResponsePacket, TransportError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(response) = this.response.poll(cx) {
            return Poll::Ready(response);
        }
        match this.sleep.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(()) => Poll::Ready(Err(TransportError::local_usage_str(
                "provider request timeout from client side",
            ))),
        }
    }
}
