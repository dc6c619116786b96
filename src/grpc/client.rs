use futures::SinkExt;
use futures::channel::mpsc;
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Streaming};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::proto;
use crate::proto::service_client::ServiceClient;

/// Client-side progress of a bidirectional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BidiPhase {
    Sending,
    Draining,
    Done,
}

/// Drives the four call patterns against a pattern server.
///
/// A single deadline is fixed when the client is built and bounds every
/// call made through it, the same way one context would in a plain gRPC
/// client. Each request carries the remaining budget as its `grpc-timeout`
/// and the client enforces it locally as well.
#[derive(Debug, Clone)]
pub struct PatternClient {
    inner: ServiceClient<Channel>,
    deadline: Instant,
    request_count: u32,
}

impl PatternClient {
    /// Connect to `config.endpoint`, failing if the server can't be reached.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let channel = endpoint(config)?
            .connect()
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: config.endpoint.clone(),
                source,
            })?;

        Ok(Self::new(channel, config))
    }

    /// Build a client whose channel connects on first use.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, ClientError> {
        let channel = endpoint(config)?.connect_lazy();
        Ok(Self::new(channel, config))
    }

    /// Wrap an existing channel. The deadline starts counting now.
    pub fn new(channel: Channel, config: &ClientConfig) -> Self {
        Self {
            inner: ServiceClient::new(channel),
            deadline: Instant::now() + config.timeout,
            request_count: config.request_count,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    fn request<T>(&self, message: T) -> Result<Request<T>, ClientError> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ClientError::DeadlineExceeded);
        }

        let mut request = Request::new(message);
        request.set_timeout(remaining);
        Ok(request)
    }

    /// Unary call. Returns the server's acknowledgement text.
    pub async fn request_response(&mut self) -> Result<String, ClientError> {
        let request = self.request(proto::Request {})?;
        let response = timeout_at(self.deadline, self.inner.request_response(request)).await??;

        let message = response.into_inner().message;
        info!("{message}");
        Ok(message)
    }

    /// Server-streaming call. Returns every response in arrival order.
    pub async fn request_response_stream(&mut self) -> Result<Vec<String>, ClientError> {
        let deadline = self.deadline;
        let request = self.request(proto::Request {})?;
        let inbound = timeout_at(deadline, self.inner.request_response_stream(request))
            .await??
            .into_inner();

        let messages = timeout_at(deadline, drain_responses(inbound)).await??;
        info!("Stream is empty");
        Ok(messages)
    }

    /// Client-streaming call. Sends `request_count` requests, then returns
    /// the server's summary.
    pub async fn stream_request_response(&mut self) -> Result<String, ClientError> {
        let outbound = futures::stream::iter((0..self.request_count).map(|_| proto::Request {}));
        let request = self.request(outbound)?;
        let response =
            timeout_at(self.deadline, self.inner.stream_request_response(request)).await??;

        let message = response.into_inner().message;
        info!("{message}");
        Ok(message)
    }

    /// Bidirectional call.
    ///
    /// A spawned task drains responses while this task sends `request_count`
    /// requests and closes its side; the call returns once the receive task
    /// reports end-of-stream, so no response is left in flight.
    pub async fn stream_request_response_stream(&mut self) -> Result<Vec<String>, ClientError> {
        let deadline = self.deadline;
        let (mut sender, outbound) = mpsc::channel::<proto::Request>(1);
        let request = self.request(outbound)?;

        let inbound = timeout_at(deadline, self.inner.stream_request_response_stream(request))
            .await??
            .into_inner();

        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = drain_responses(inbound).await;
            // The caller may have given up already.
            let _ = done_tx.send(result);
        });

        let mut phase = BidiPhase::Sending;
        debug!(?phase, "Bidirectional call started");

        for _ in 0..self.request_count {
            let sent = timeout_at(deadline, sender.send(proto::Request {})).await?;
            if sent.is_err() {
                // The transport dropped our requests; the receive side knows why.
                return match timeout_at(deadline, done_rx).await? {
                    Ok(Err(err)) => Err(err),
                    _ => Err(ClientError::SendClosed),
                };
            }
        }

        sender.close_channel();
        phase = BidiPhase::Draining;
        debug!(?phase, "Request stream closed");

        let messages = timeout_at(deadline, done_rx)
            .await?
            .map_err(|_| ClientError::CompletionDropped)??;

        phase = BidiPhase::Done;
        debug!(?phase, received = messages.len(), "Bidirectional call finished");
        Ok(messages)
    }
}

fn endpoint(config: &ClientConfig) -> Result<Endpoint, ClientError> {
    let endpoint = Endpoint::from_shared(config.endpoint.clone()).map_err(|source| {
        ClientError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            source,
        }
    })?;

    Ok(endpoint.connect_timeout(config.timeout))
}

/// Receive until end-of-stream, logging each message.
async fn drain_responses(
    mut inbound: Streaming<proto::Response>,
) -> Result<Vec<String>, ClientError> {
    let mut messages = Vec::new();
    while let Some(response) = inbound.message().await? {
        info!("{}", response.message);
        messages.push(response.message);
    }
    Ok(messages)
}
