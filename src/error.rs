use std::net::SocketAddr;

use thiserror::Error;
use tonic::{Code, Status};

/// Errors returned by the pattern client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The configured endpoint is not a valid URI.
    #[error("invalid endpoint '{endpoint}'")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// The channel to the server could not be established.
    #[error("failed to connect to {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// The call failed with a gRPC status.
    #[error("RPC failed: {0}")]
    Rpc(Status),

    /// The shared deadline passed before the call finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The transport dropped the outbound request stream.
    #[error("request stream closed before all requests were sent")]
    SendClosed,

    /// The receive task ended without reporting completion.
    #[error("receive task exited without signalling completion")]
    CompletionDropped,
}

impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        if status.code() == Code::DeadlineExceeded || timed_out(&status) {
            return ClientError::DeadlineExceeded;
        }
        ClientError::Rpc(status)
    }
}

// tonic enforces `grpc-timeout` on the client too and reports expiry as a
// CANCELLED status carrying `TimeoutExpired` somewhere in its source chain.
fn timed_out(status: &Status) -> bool {
    let mut source = std::error::Error::source(status);
    while let Some(err) = source {
        if err.is::<tonic::TimeoutExpired>() {
            return true;
        }
        source = err.source();
    }
    false
}

impl From<tokio::time::error::Elapsed> for ClientError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ClientError::DeadlineExceeded
    }
}

/// Errors that can occur while running the pattern server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to listen on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The gRPC server stopped with a transport error.
    #[error("gRPC transport error")]
    Transport(#[from] tonic::transport::Error),
}
