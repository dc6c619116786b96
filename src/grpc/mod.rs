mod client;
mod server;

pub use crate::proto::service_client::ServiceClient;
pub use crate::proto::service_server::ServiceServer;
pub use client::PatternClient;
pub use server::{PatternService, count_response, numbered_response, serve_with_shutdown, start_server};
