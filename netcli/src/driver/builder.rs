//! Builder for device clients.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::catalog::DeviceClient;
use crate::channel::{ReadStrategy, ShellOptions, WaitProfile, compile_prompt_pattern};
use crate::error::{DriverError, Error, Result};
use crate::platform::{PlatformDefinition, PlatformRegistry, vendors};
use crate::transport::{AuthMethod, Connector, HostKeyVerification, SshConfig, SshConnector};

/// Builder for constructing a [`DeviceClient`].
///
/// # Example
///
/// ```rust,no_run
/// use netcli::DeviceBuilder;
///
/// # async fn example() -> Result<(), netcli::Error> {
/// let client = DeviceBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .platform("cisco_ios")
///     .build()?;
///
/// let interfaces = client.list_interfaces().await;
/// # Ok(())
/// # }
/// ```
pub struct DeviceBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    platform_name: Option<String>,
    custom_platform: Option<PlatformDefinition>,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    options: ShellOptions,
    prompt_pattern: Option<String>,
    waits: WaitProfile,
}

impl DeviceBuilder {
    /// Create a new builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            platform_name: None,
            custom_platform: None,
            timeout: Duration::from_secs(10),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            options: ShellOptions::default(),
            prompt_pattern: None,
            waits: WaitProfile::default(),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the platform name (default: "cisco_ios").
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform_name = Some(platform.into());
        self
    }

    /// Set a custom platform definition.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Set the connection timeout (default: 10s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the host key verification mode (default: accept-new).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Choose how command output completion is detected.
    pub fn read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Delay before the login banner is discarded (default: 1s).
    pub fn settle(mut self, settle: Duration) -> Self {
        self.options.settle = settle;
        self
    }

    /// Override the platform's prompt pattern.
    pub fn prompt_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.prompt_pattern = Some(pattern.into());
        self
    }

    /// Set per-command wait limits.
    pub fn wait_profile(mut self, waits: WaitProfile) -> Self {
        self.waits = waits;
        self
    }

    /// Build a client that connects over SSH.
    ///
    /// No connection is made here; every operation connects on its own.
    pub fn build(self) -> Result<DeviceClient<SshConnector>> {
        self.build_with(SshConnector)
    }

    /// Build a client that connects through `connector`.
    pub fn build_with<C: Connector>(self, connector: C) -> Result<DeviceClient<C>> {
        if self.host.trim().is_empty() {
            return Err(invalid_config("Host is required"));
        }
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| invalid_config("Username is required"))?;

        let platform = match (self.custom_platform, self.platform_name) {
            (Some(custom), _) => custom,
            (None, Some(name)) => PlatformRegistry::lookup(&name)?,
            (None, None) => PlatformRegistry::lookup(vendors::cisco_ios::PLATFORM_NAME)?,
        };

        let mut options = self.options;
        if let Some(pattern) = self.prompt_pattern {
            let regex = compile_prompt_pattern(&pattern)
                .map_err(|e| invalid_config(&format!("Invalid prompt pattern: {e}")))?;
            options.prompt_pattern = Some(regex);
        }

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok(DeviceClient::new(
            connector,
            ssh_config,
            platform,
            options,
            self.waits,
        ))
    }
}

fn invalid_config(message: &str) -> Error {
    DriverError::InvalidConfig {
        message: message.to_string(),
    }
    .into()
}
