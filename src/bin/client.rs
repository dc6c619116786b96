use anyhow::Result;
use grpc_patterns::grpc::PatternClient;
use grpc_patterns::{ClientConfig, ClientError, Operation};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    grpc_patterns::init_tracing();

    let config = ClientConfig::default();

    // One deadline covers all four calls.
    let mut client = PatternClient::connect(&config)
        .await
        .inspect_err(|e| error!(endpoint = %config.endpoint, error = %e, "Failed to connect"))?;

    client
        .request_response()
        .await
        .inspect_err(|e| report(Operation::RequestResponse, e))?;

    client
        .request_response_stream()
        .await
        .inspect_err(|e| report(Operation::RequestResponseStream, e))?;

    client
        .stream_request_response()
        .await
        .inspect_err(|e| report(Operation::StreamRequestResponse, e))?;

    client
        .stream_request_response_stream()
        .await
        .inspect_err(|e| report(Operation::StreamRequestResponseStream, e))?;

    Ok(())
}

fn report(operation: Operation, err: &ClientError) {
    error!(%operation, error = %err, "Call failed");
}
