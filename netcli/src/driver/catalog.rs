//! Device operations.
//!
//! Every operation validates its arguments, opens its own session, runs one
//! command or one configuration script, closes the session, and returns a
//! typed result. Arguments are checked and platform support is resolved
//! before any connection is attempted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use super::result::CommandResult;
use super::sequencer::{TransactionReport, run_script};
use crate::channel::{Completion, InteractiveShell, ShellOptions, WaitProfile};
use crate::error::{Error, OperationResult, PlatformError, Result, ValidationError};
use crate::parser::{
    InterfaceAddress, InterfaceRecord, parse_interface_brief, parse_interface_detail,
};
use crate::platform::{ConfigScript, PlatformDefinition, SwitchportMode};
use crate::transport::{Connector, Session, SshConfig};

/// Highest assignable VLAN id.
const MAX_VLAN: u32 = 4094;

/// Result of a configuration operation.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    /// Human-readable confirmation including the save output.
    pub summary: String,
    pub transaction: TransactionReport,
}

/// Detailed view of one interface.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceDetails {
    #[serde(flatten)]
    pub record: InterfaceRecord,
    /// Unparsed command output.
    pub raw_output: String,
}

/// Result of [`DeviceClient::backup_running_config`].
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub config: String,
    /// How the fetch ended. Anything but a returned prompt means the
    /// configuration may be cut short.
    pub completion: Completion,
    /// Destination the configuration was written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
    /// Why writing the file failed. The fetched config is still returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_error: Option<String>,
}

impl BackupReport {
    /// True when the device prompt came back after the configuration.
    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Prompt
    }
}

/// Operation catalog bound to one device configuration.
///
/// Holds no connection; each call connects through `C` and releases the
/// session before returning.
pub struct DeviceClient<C: Connector> {
    connector: C,
    config: SshConfig,
    platform: PlatformDefinition,
    options: ShellOptions,
    waits: WaitProfile,
}

impl<C: Connector> DeviceClient<C> {
    /// Create a client.
    pub fn new(
        connector: C,
        config: SshConfig,
        platform: PlatformDefinition,
        options: ShellOptions,
        waits: WaitProfile,
    ) -> Self {
        Self {
            connector,
            config,
            platform,
            options,
            waits,
        }
    }

    /// Connection settings used by every operation.
    pub fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Platform of the target device.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Run a raw command, optionally against a different host.
    pub async fn run_command(
        &self,
        command: &str,
        host: Option<&str>,
    ) -> OperationResult<CommandResult> {
        if command.trim().is_empty() {
            return Err(Error::from(invalid("command", "must not be empty")).into());
        }

        let config = match host.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => self.config.with_host(host),
            None => self.config.clone(),
        };
        info!("run_command on {}: {}", config.socket_addr(), command);

        Ok(self.execute_on(&config, command, self.waits.short).await?)
    }

    /// Assign an address (`a.b.c.d/len`, or bare `a.b.c.d` for /24).
    pub async fn add_ip_address(
        &self,
        address: &str,
        interface: &str,
    ) -> OperationResult<ConfigReport> {
        let address: InterfaceAddress = address.parse().map_err(Error::from)?;
        require_line("interface name", interface)?;
        if !address.explicit_prefix {
            info!("no prefix given for {}, assuming /{}", address.ip, address.prefix);
        }

        let script = self.platform.dialect.add_address(interface, &address);
        let transaction = self.configure(script).await?;
        Ok(report(
            format!("IP {} added to interface {}.", address, interface),
            transaction,
        ))
    }

    /// Summary of every interface.
    pub async fn list_interfaces(&self) -> OperationResult<Vec<InterfaceRecord>> {
        let command = self.supported("list_interfaces", self.platform.dialect.interface_brief())?;
        let result = self.execute(&command, self.waits.long).await?;
        Ok(parse_interface_brief(&result.output))
    }

    /// Detailed fields of one interface, plus the raw text.
    pub async fn get_interface_details(
        &self,
        interface: &str,
    ) -> OperationResult<InterfaceDetails> {
        require_line("interface name", interface)?;
        let command = self.supported(
            "get_interface_details",
            self.platform.dialect.interface_detail(interface),
        )?;

        let result = self.execute(&command, self.waits.long).await?;
        Ok(InterfaceDetails {
            record: parse_interface_detail(interface, &result.output),
            raw_output: result.output,
        })
    }

    /// Set the free-text description of an interface.
    pub async fn set_interface_description(
        &self,
        interface: &str,
        description: &str,
    ) -> OperationResult<ConfigReport> {
        require_line("interface name", interface)?;
        require_line("description", description)?;

        let script = self.platform.dialect.set_description(interface, description);
        let transaction = self.configure(script).await?;
        Ok(report(
            format!(
                "Description for interface {} set to '{}'.",
                interface, description
            ),
            transaction,
        ))
    }

    /// Administratively enable or disable an interface.
    pub async fn set_interface_status(
        &self,
        interface: &str,
        enabled: bool,
    ) -> OperationResult<ConfigReport> {
        require_line("interface name", interface)?;

        let script = self.platform.dialect.set_enabled(interface, enabled);
        let transaction = self.configure(script).await?;
        let status = if enabled { "enabled" } else { "disabled" };
        Ok(report(
            format!("Interface {} {}.", interface, status),
            transaction,
        ))
    }

    /// Put an interface in access or trunk mode.
    ///
    /// `vlan` is only applied in access mode.
    pub async fn configure_switchport(
        &self,
        interface: &str,
        mode: &str,
        vlan: Option<u32>,
    ) -> OperationResult<ConfigReport> {
        let mode: SwitchportMode = mode.parse().map_err(Error::from)?;
        require_line("interface name", interface)?;
        let vlan = vlan.map(check_vlan).transpose()?;

        let script = self.supported(
            "configure_switchport",
            self.platform.dialect.switchport(interface, mode, vlan),
        )?;
        let transaction = self.configure(script).await?;

        let summary = match (mode, vlan) {
            (SwitchportMode::Access, Some(vlan)) => format!(
                "Interface {} configured as {} port with VLAN {}.",
                interface, mode, vlan
            ),
            _ => format!("Interface {} configured as {} port.", interface, mode),
        };
        Ok(report(summary, transaction))
    }

    /// Fetch the running configuration and optionally write it to `path`.
    ///
    /// A failed write is reported in [`BackupReport::write_error`]; the
    /// fetched configuration is returned either way.
    pub async fn backup_running_config(
        &self,
        path: Option<&Path>,
    ) -> OperationResult<BackupReport> {
        let command = self.platform.dialect.running_config();
        let result = self.execute(&command, self.waits.dump).await?;
        if !result.is_complete() {
            warn!("running config may be truncated after {:?}", result.elapsed);
        }

        let mut backup = BackupReport {
            config: result.output,
            completion: result.completion,
            saved_to: None,
            write_error: None,
        };

        if let Some(path) = path {
            match tokio::fs::write(path, backup.config.as_bytes()).await {
                Ok(()) => {
                    info!("running config saved to {}", path.display());
                    backup.saved_to = Some(path.to_path_buf());
                }
                Err(e) => {
                    warn!("failed to write {}: {}", path.display(), e);
                    backup.write_error = Some(e.to_string());
                }
            }
        }
        Ok(backup)
    }

    /// Run one command on a fresh session.
    async fn execute(&self, command: &str, wait: Duration) -> Result<CommandResult> {
        self.execute_on(&self.config, command, wait).await
    }

    async fn execute_on(
        &self,
        config: &SshConfig,
        command: &str,
        wait: Duration,
    ) -> Result<CommandResult> {
        info!("{} on {}", command, config.socket_addr());
        let mut shell = self.open_shell(config).await?;
        let result = shell.execute(command, wait).await;
        shell.close().await;
        result
    }

    /// Run one configuration script on a fresh session.
    async fn configure(&self, script: ConfigScript) -> Result<TransactionReport> {
        info!(
            "configuring {} on {}",
            script.scope.as_deref().unwrap_or("device"),
            self.config.socket_addr()
        );
        let mut shell = self.open_shell(&self.config).await?;
        let result = run_script(&mut shell, &script, self.waits.short).await;
        shell.close().await;
        result
    }

    /// Connect and settle a shell. The session is closed again if settling
    /// fails; otherwise closing is up to the caller.
    async fn open_shell(&self, config: &SshConfig) -> Result<InteractiveShell<C::Transport>> {
        let mut session = Session::new(&config.host, config.port);
        session.connect(&self.connector, config).await?;

        let mut shell =
            InteractiveShell::new(session, self.platform.clone(), self.options.clone());
        if let Err(e) = shell.settle(self.waits.short).await {
            shell.close().await;
            return Err(e);
        }
        Ok(shell)
    }

    fn supported<T>(&self, operation: &str, command: Option<T>) -> Result<T> {
        command.ok_or_else(|| {
            PlatformError::Unsupported {
                platform: self.platform.name.clone(),
                operation: operation.to_string(),
            }
            .into()
        })
    }
}

fn report(summary: String, transaction: TransactionReport) -> ConfigReport {
    let tail = transaction
        .save_output
        .as_deref()
        .unwrap_or(&transaction.output)
        .trim();
    let summary = if tail.is_empty() {
        summary
    } else {
        format!("{} {}", summary, tail)
    };
    ConfigReport {
        summary,
        transaction,
    }
}

fn invalid(name: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidArgument {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Non-empty and single-line: a newline would run extra device commands.
fn require_line(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(name, "must not be empty").into());
    }
    if value.contains(['\n', '\r']) {
        return Err(invalid(name, "must be a single line").into());
    }
    Ok(())
}

fn check_vlan(vlan: u32) -> Result<u16> {
    match u16::try_from(vlan) {
        Ok(id) if (1..=MAX_VLAN).contains(&vlan) => Ok(id),
        _ => Err(ValidationError::InvalidVlan(vlan).into()),
    }
}
