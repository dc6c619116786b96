use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use tokio::net::TcpListener;
use tonic::transport::server::TcpIncoming;
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::operation::Operation;
use crate::proto;
use crate::proto::service_server::{Service, ServiceServer};

type ResponseStream = Pin<Box<dyn Stream<Item = Result<proto::Response, Status>> + Send>>;

/// Bind `config.listen_addr` and serve until the transport fails.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.listen_addr;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve_with_shutdown(listener, config, std::future::pending()).await
}

/// Serve on an already bound listener until `signal` resolves.
///
/// `config.listen_addr` is ignored here; the listener decides where we are.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    config: ServerConfig,
    signal: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    let service = PatternService::new(config);

    info!(%addr, operations = ?Operation::ALL, "gRPC server listening");

    tonic::transport::Server::builder()
        .trace_fn(|request| {
            let operation = Operation::from_path(request.uri().path());
            tracing::info_span!("rpc", %operation)
        })
        .add_service(ServiceServer::new(service))
        .serve_with_incoming_shutdown(TcpIncoming::from(listener), signal)
        .await?;

    info!(%addr, "gRPC server stopped");
    Ok(())
}

/// `"Response {n}"`, the reply used by both streaming-response calls.
pub fn numbered_response(n: u32) -> proto::Response {
    proto::Response {
        message: format!("Response {n}"),
    }
}

/// `"Request stream count = {n}"`, the client-streaming summary.
pub fn count_response(n: u32) -> proto::Response {
    proto::Response {
        message: format!("Request stream count = {n}"),
    }
}

fn boxed<S>(stream: S) -> ResponseStream
where
    S: Stream<Item = Result<proto::Response, Status>> + Send + 'static,
{
    Box::pin(stream)
}

/// Stateless implementation of `service.Service`.
///
/// Every call builds its replies from the injected config; nothing is
/// carried from one call to the next.
#[derive(Debug, Clone)]
pub struct PatternService {
    config: Arc<ServerConfig>,
}

impl PatternService {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[tonic::async_trait]
impl Service for PatternService {
    type RequestResponseStreamStream = ResponseStream;
    type StreamRequestResponseStreamStream = ResponseStream;

    async fn request_response(
        &self,
        _request: Request<proto::Request>,
    ) -> Result<Response<proto::Response>, Status> {
        Ok(Response::new(proto::Response {
            message: self.config.acknowledgement.clone(),
        }))
    }

    async fn request_response_stream(
        &self,
        _request: Request<proto::Request>,
    ) -> Result<Response<Self::RequestResponseStreamStream>, Status> {
        let length = self.config.stream_length;

        let outbound = async_stream::stream! {
            for n in 1..=length {
                yield Ok(numbered_response(n));
            }
        };

        Ok(Response::new(boxed(outbound)))
    }

    async fn stream_request_response(
        &self,
        request: Request<Streaming<proto::Request>>,
    ) -> Result<Response<proto::Response>, Status> {
        let mut inbound = request.into_inner();
        let mut count = 0u32;

        loop {
            match inbound.message().await {
                Ok(Some(_)) => {
                    count += 1;
                    info!("Request: {count}");
                }
                Ok(None) => break,
                Err(status) => {
                    warn!(received = count, error = %status, "Request stream failed");
                    return Err(status);
                }
            }
        }

        Ok(Response::new(count_response(count)))
    }

    async fn stream_request_response_stream(
        &self,
        request: Request<Streaming<proto::Request>>,
    ) -> Result<Response<Self::StreamRequestResponseStreamStream>, Status> {
        let mut inbound = request.into_inner();

        // One reply per request, produced only after that request arrives.
        let outbound = async_stream::stream! {
            let mut count = 0u32;
            loop {
                match inbound.message().await {
                    Ok(Some(_)) => {
                        count += 1;
                        info!("Request: {count}");
                        yield Ok(numbered_response(count));
                    }
                    Ok(None) => break,
                    Err(status) => {
                        warn!(received = count, error = %status, "Bidirectional stream failed");
                        yield Err(status);
                        break;
                    }
                }
            }
        };

        Ok(Response::new(boxed(outbound)))
    }
}
