use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 50053;

/// Configuration for the pattern server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: SocketAddr,

    /// Number of responses sent by the server-streaming call.
    pub stream_length: u32,

    /// Fixed reply text of the unary call.
    pub acknowledgement: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            stream_length: 3,
            acknowledgement: "A Response to your request!".to_string(),
        }
    }
}

impl ServerConfig {
    /// Set the listen address.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set how many responses the server-streaming call produces.
    pub fn with_stream_length(mut self, length: u32) -> Self {
        self.stream_length = length;
        self
    }

    /// Set the unary acknowledgement text.
    pub fn with_acknowledgement(mut self, text: impl Into<String>) -> Self {
        self.acknowledgement = text.into();
        self
    }
}

/// Configuration for the pattern client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URI of the server, e.g. `http://localhost:50053`.
    pub endpoint: String,

    /// Budget shared by every call made through one client.
    pub timeout: Duration,

    /// Requests sent by each of the client-streaming and bidirectional calls.
    pub request_count: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("http://localhost:{DEFAULT_PORT}"),
            timeout: Duration::from_secs(1),
            request_count: 3,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the shared call deadline, measured from client creation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many requests the streaming uploads send.
    pub fn with_request_count(mut self, count: u32) -> Self {
        self.request_count = count;
        self
    }
}
