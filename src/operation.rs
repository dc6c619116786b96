use std::fmt;

/// Fully qualified name of the service every operation belongs to.
pub const SERVICE_NAME: &str = "service.Service";

/// Shape of a call: how many messages flow in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Unary,
    ServerStreaming,
    ClientStreaming,
    Bidirectional,
}

/// The operations the server answers, plus a fallback for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RequestResponse,
    RequestResponseStream,
    StreamRequestResponse,
    StreamRequestResponseStream,
    Unimplemented,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::RequestResponse,
        Operation::RequestResponseStream,
        Operation::StreamRequestResponse,
        Operation::StreamRequestResponseStream,
    ];

    /// Method name as declared in the proto file.
    pub fn method(&self) -> &'static str {
        match self {
            Operation::RequestResponse => "RequestResponse",
            Operation::RequestResponseStream => "RequestResponseStream",
            Operation::StreamRequestResponse => "StreamRequestResponse",
            Operation::StreamRequestResponseStream => "StreamRequestResponseStream",
            Operation::Unimplemented => "unimplemented",
        }
    }

    /// HTTP/2 path the operation is served under.
    pub fn path(&self) -> String {
        format!("/{SERVICE_NAME}/{}", self.method())
    }

    pub fn kind(&self) -> Option<CallKind> {
        match self {
            Operation::RequestResponse => Some(CallKind::Unary),
            Operation::RequestResponseStream => Some(CallKind::ServerStreaming),
            Operation::StreamRequestResponse => Some(CallKind::ClientStreaming),
            Operation::StreamRequestResponseStream => Some(CallKind::Bidirectional),
            Operation::Unimplemented => None,
        }
    }

    /// Resolve a request path to an operation.
    ///
    /// Paths that don't parse, name another service, or name an unknown
    /// method all resolve to `Unimplemented`.
    pub fn from_path(path: &str) -> Self {
        let path = path.strip_prefix('/').unwrap_or(path);
        match path.rsplit_once('/') {
            Some((SERVICE_NAME, method)) => Self::ALL
                .into_iter()
                .find(|op| op.method() == method)
                .unwrap_or(Operation::Unimplemented),
            _ => Operation::Unimplemented,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}
