pub mod config;
pub mod error;
pub mod grpc;
pub mod operation;

pub use config::{ClientConfig, ServerConfig};
pub use error::{ClientError, ServerError};
pub use operation::{CallKind, Operation};

pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/service.rs"));
}

/// Install the fmt subscriber used by both binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();
}
