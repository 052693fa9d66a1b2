//! Per-operation session lifecycle.

use std::fmt;

use log::{debug, warn};

use super::config::SshConfig;
use super::{Connector, Transport};
use crate::error::{DriverError, Result};

/// Connection state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One live connection to a device.
///
/// A `Ready` session owns exactly one transport. Sessions are created per
/// operation and never shared; `&mut` access serializes command execution.
pub struct Session<T: Transport> {
    host: String,
    port: u16,
    state: SessionState,
    transport: Option<T>,
}

impl<T: Transport> Session<T> {
    /// Create a disconnected session for `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            state: SessionState::Disconnected,
            transport: None,
        }
    }

    /// Connect through `connector`. A single attempt; failure leaves the
    /// session in [`SessionState::Failed`].
    pub async fn connect<C>(&mut self, connector: &C, config: &SshConfig) -> Result<()>
    where
        C: Connector<Transport = T>,
    {
        if self.transport.is_some() {
            return Ok(());
        }

        self.state = SessionState::Connecting;
        match connector.connect(config).await {
            Ok(transport) => {
                debug!("session to {}:{} ready", self.host, self.port);
                self.transport = Some(transport);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("connection to {}:{} failed: {}", self.host, self.port, e);
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Mutable access to the transport of a ready session.
    pub fn transport_mut(&mut self) -> Result<&mut T> {
        self.transport
            .as_mut()
            .ok_or_else(|| DriverError::NotConnected.into())
    }

    /// Close the transport. Safe to call any number of times.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            debug!("session to {}:{} closed", self.host, self.port);
        }
        if self.state != SessionState::Failed {
            self.state = SessionState::Disconnected;
        }
    }
}
