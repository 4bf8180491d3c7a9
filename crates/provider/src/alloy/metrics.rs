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

use std::{
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, ResponsePayload, RpcError};
use alloy_transport::{BoxFuture, TransportError};
use futures_util::FutureExt;
use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;
use parse_display::Display;
use tower::{Layer, Service};

/// Layer recording per-method metrics of the provider transport
#[derive(Debug, Default, Clone)]
pub(crate) struct AlloyMetricLayer {}

impl<S> Layer<S> for AlloyMetricLayer
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError> + Sync,
{
    type Service = AlloyMetricMiddleware<S>;

    fn layer(&self, service: S) -> Self::Service {
        AlloyMetricMiddleware { service }
    }
}

/// Transport middleware recording request counts, latency and status codes
#[derive(Debug, Clone)]
pub(crate) struct AlloyMetricMiddleware<S> {
    service: S,
}

impl<S> Service<RequestPacket> for AlloyMetricMiddleware<S>
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
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let session = RequestSession::start(method_name(&request));
        let mut svc = self.service.clone();
        async move {
            let response = svc.call(request).await;
            session.done();
            let (http, rpc) = match &response {
                Ok(resp) => (HttpCode::TwoHundreds, response_status(resp)),
                Err(err) => error_status(err),
            };
            session.record(http, rpc);
            response
        }
        .boxed()
    }
}

#[derive(Metrics)]
#[metrics(scope = "aakit_provider_rpc")]
struct RequestMetrics {
    #[metric(describe = "total count of requests.")]
    num_requests: Counter,

    #[metric(describe = "the number of open requests.")]
    open_requests: Gauge,

    #[metric(describe = "the distribution of request latency in milliseconds.")]
    request_latency: Histogram,
}

#[derive(Metrics)]
#[metrics(scope = "aakit_provider_rpc")]
struct StatusMetrics {
    #[metric(describe = "the count of http response status.")]
    http_response_status: Counter,

    #[metric(describe = "the count of rpc response status.")]
    rpc_response_status: Counter,
}

/// Metrics of a single in-flight request
struct RequestSession {
    start_time: Instant,
    method_name: String,
    metrics: RequestMetrics,
}

impl RequestSession {
    fn start(method_name: String) -> Self {
        let metrics = RequestMetrics::new_with_labels(&[("method_name", method_name.clone())]);
        metrics.num_requests.increment(1);
        metrics.open_requests.increment(1);
        Self {
            start_time: Instant::now(),
            method_name,
            metrics,
        }
    }

    fn done(&self) {
        self.metrics.open_requests.decrement(1);
        self.metrics
            .request_latency
            .record(self.start_time.elapsed().as_millis() as f64);
    }

    fn record(&self, http: HttpCode, rpc: RpcCode) {
        StatusMetrics::new_with_labels(&[
            ("method_name", self.method_name.clone()),
            ("status_code", http.to_string()),
        ])
        .http_response_status
        .increment(1);
        StatusMetrics::new_with_labels(&[
            ("method_name", self.method_name.clone()),
            ("status_code", rpc.to_string()),
        ])
        .rpc_response_status
        .increment(1);
    }
}

#[derive(Debug, Display, PartialEq, Eq)]
#[display(style = "snake_case")]
enum RpcCode {
    Success,
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,
    Other,
}

#[derive(Debug, Display, PartialEq, Eq)]
#[display(style = "snake_case")]
enum HttpCode {
    TwoHundreds,
    FourHundreds,
    FiveHundreds,
}

fn method_name(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(request) => request.method().to_string(),
        // batches carry several methods
        RequestPacket::Batch(_) => "batch".to_string(),
    }
}

fn response_status(response: &ResponsePacket) -> RpcCode {
    let payload = match response {
        ResponsePacket::Single(resp) => &resp.payload,
        ResponsePacket::Batch(resps) => match resps.first() {
            Some(resp) => &resp.payload,
            None => return RpcCode::Success,
        },
    };
    match payload {
        ResponsePayload::Success(_) => RpcCode::Success,
        ResponsePayload::Failure(err) => rpc_code(err.code),
    }
}

fn rpc_code(code: i64) -> RpcCode {
    match code {
        -32700 => RpcCode::ParseError,
        -32600 => RpcCode::InvalidRequest,
        -32601 => RpcCode::MethodNotFound,
        -32602 => RpcCode::InvalidParams,
        -32603 => RpcCode::InternalError,
        -32099..=-32000 => RpcCode::ServerError,
        _ => RpcCode::Other,
    }
}

fn error_status(err: &TransportError) -> (HttpCode, RpcCode) {
    match err {
        // error payloads arrive in a successful http response
        RpcError::ErrorResp(payload) => (HttpCode::TwoHundreds, rpc_code(payload.code)),
        RpcError::NullResp | RpcError::SerError(_) => {
            (HttpCode::FiveHundreds, RpcCode::InternalError)
        }
        RpcError::UnsupportedFeature(_) => (HttpCode::FourHundreds, RpcCode::MethodNotFound),
        RpcError::LocalUsageError(_) => (HttpCode::FourHundreds, RpcCode::InvalidRequest),
        RpcError::DeserError { .. } => (HttpCode::FourHundreds, RpcCode::ParseError),
        _ => (HttpCode::FiveHundreds, RpcCode::ServerError),
    }
}

#[cfg(test)]
mod tests {
    use alloy_json_rpc::ErrorPayload;

    use super::*;

    #[test]
    fn test_rpc_codes() {
        assert_eq!(rpc_code(-32601), RpcCode::MethodNotFound);
        assert_eq!(rpc_code(-32050), RpcCode::ServerError);
        assert_eq!(rpc_code(3), RpcCode::Other);
        assert_eq!(RpcCode::MethodNotFound.to_string(), "method_not_found");
        assert_eq!(HttpCode::FiveHundreds.to_string(), "five_hundreds");
    }

    #[test]
    fn test_error_status() {
        let err = TransportError::local_usage_str("provider request timeout from client side");
        assert_eq!(
            error_status(&err),
            (HttpCode::FourHundreds, RpcCode::InvalidRequest)
        );
        assert_eq!(
            error_status(&TransportError::NullResp),
            (HttpCode::FiveHundreds, RpcCode::InternalError)
        );
    }

    #[test]
    fn test_error_response_status() {
        let err = TransportError::ErrorResp(ErrorPayload {
            code: -32602,
            message: "invalid params".into(),
            data: None,
        });
        assert_eq!(
            error_status(&err),
            (HttpCode::TwoHundreds, RpcCode::InvalidParams)
        );
    }
}
