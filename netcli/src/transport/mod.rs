//! SSH transport layer.
//!
//! [`Transport`] is the raw byte channel to one device; [`Connector`]
//! produces authenticated transports. The russh-backed implementations are
//! [`SshTransport`] and [`SshConnector`]; tests substitute in-memory fakes.

pub mod config;
mod session;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use session::{Session, SessionState};
pub use ssh::{SshConnector, SshTransport};

use std::future::Future;

use crate::error::Result;

/// A connected, authenticated byte channel with an interactive shell on
/// the far end.
pub trait Transport: Send {
    /// Write raw bytes to the channel.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Drain whatever is currently buffered.
    ///
    /// Never waits for more data; returns an empty vector when nothing is
    /// ready.
    fn receive_available(&mut self) -> Result<Vec<u8>>;

    /// Release the channel. Idempotent and infallible.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens transports. One connection attempt per call, no retries.
pub trait Connector: Send + Sync {
    /// Transport produced by this connector.
    type Transport: Transport;

    /// Connect, authenticate and allocate an interactive shell channel.
    fn connect(&self, config: &SshConfig) -> impl Future<Output = Result<Self::Transport>> + Send;
}
