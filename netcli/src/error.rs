//! Error types for netcli.
//!
//! Library code returns [`Error`]. The operation catalog converts it into an
//! [`OperationError`] carrying a machine-readable [`ErrorKind`], and only the
//! tool boundary renders that into text.

use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Main error type for netcli operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Caller-supplied arguments rejected before any connection is made
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Classify this error for callers that need to branch on it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Connection,
            Error::Channel(_) => ErrorKind::Channel,
            Error::Driver(DriverError::TransactionAborted { source, .. }) => source.kind(),
            Error::Driver(DriverError::NotConnected) => ErrorKind::Channel,
            Error::Driver(DriverError::InvalidConfig { .. }) => ErrorKind::Configuration,
            Error::Platform(PlatformError::Unsupported { .. }) => ErrorKind::Unsupported,
            Error::Platform(_) => ErrorKind::Configuration,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The host presented a key different from the one in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Strict verification and the host is not in known_hosts
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Reading or writing known_hosts failed
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection establishment timed out
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (PTY, shell, send/receive).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open PTY channel
    #[error("Failed to open PTY channel: {0}")]
    PtyOpenFailed(russh::Error),

    /// Failed to request shell
    #[error("Failed to request shell: {0}")]
    ShellRequestFailed(russh::Error),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Driver layer errors (session state, configuration transactions).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Session not connected
    #[error("Session not connected")]
    NotConnected,

    /// Invalid configuration in the device builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A configuration script failed part way through.
    ///
    /// `partial_output` holds everything the device returned before the
    /// failure. Changes applied before the failing step are not rolled back.
    #[error("Configuration aborted while {state}: {source}")]
    TransactionAborted {
        state: String,
        partial_output: String,
        #[source]
        source: Box<Error>,
    },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// No platform registered under this name
    #[error("Unknown platform '{name}'")]
    UnknownPlatform { name: String },

    /// A platform with this name is already registered
    #[error("Platform '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// The platform has no command for this operation
    #[error("Operation '{operation}' is not supported on platform '{platform}'")]
    Unsupported { platform: String, operation: String },
}

/// Argument validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not `a.b.c.d` or `a.b.c.d/len`
    #[error("Invalid IP address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    /// CIDR prefix outside 0-32
    #[error("Invalid prefix length {0}: must be between 0 and 32")]
    InvalidPrefix(u32),

    /// Switchport mode outside {access, trunk}
    #[error("Mode must be 'access' or 'trunk', got '{mode}'")]
    InvalidSwitchportMode { mode: String },

    /// VLAN id outside 1-4094
    #[error("Invalid VLAN {0}: must be between 1 and 4094")]
    InvalidVlan(u32),

    /// Generic argument precondition failure
    #[error("Invalid {name}: {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Authentication or network failure while opening the session.
    Connection,
    /// Send/receive failure on an established channel.
    Channel,
    /// Caller argument rejected before connecting.
    Validation,
    /// The platform cannot perform the operation.
    Unsupported,
    /// Local configuration problem (unknown platform, missing username).
    Configuration,
}

/// Failure value returned by every catalog operation.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_output: Option<String>,
}

impl OperationError {
    /// Render as the human-readable failure string for `action`.
    pub fn render(&self, action: &str) -> String {
        let mut text = match self.kind {
            ErrorKind::Validation => format!("Error: {}", self.message),
            _ => format!("Failed to {}: {}", action, self.message),
        };
        if let Some(partial) = self.partial_output.as_deref().filter(|p| !p.is_empty()) {
            text.push_str("\n\nPartial output:\n");
            text.push_str(partial);
        }
        text
    }
}

impl From<Error> for OperationError {
    fn from(err: Error) -> Self {
        let partial_output = match &err {
            Error::Driver(DriverError::TransactionAborted { partial_output, .. }) => {
                Some(partial_output.clone())
            }
            _ => None,
        };
        Self {
            kind: err.kind(),
            message: err.to_string(),
            partial_output,
        }
    }
}

/// Result type alias using netcli's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by catalog operations.
pub type OperationResult<T> = std::result::Result<T, OperationError>;
