//! Platform definitions for multi-vendor support.
//!
//! A platform pairs prompt patterns (privilege levels) with a [`Dialect`],
//! the vendor's command vocabulary. Commands are vendor-specific strings;
//! there is no device-agnostic command abstraction beyond what a dialect
//! chooses to emit.

mod definition;
mod privilege_level;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
pub use registry::PlatformRegistry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::parser::InterfaceAddress;

/// Commands that frame a configuration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFrame {
    /// Enter global configuration mode.
    pub enter: String,
    /// Return to operational mode.
    pub exit: String,
    /// Persist the configuration, run after `exit`.
    pub save: Option<String>,
}

/// Ordered commands for one logical configuration change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigScript {
    /// Scope command (e.g. `interface Gi0/0`) issued before `commands`.
    pub scope: Option<String>,
    /// Scoped commands; order is preserved.
    pub commands: Vec<String>,
}

impl ConfigScript {
    /// Script scoped by `scope`.
    pub fn scoped(scope: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            commands,
        }
    }

    /// Script with no scope command.
    pub fn unscoped(commands: Vec<String>) -> Self {
        Self {
            scope: None,
            commands,
        }
    }
}

/// Layer-2 port mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchportMode {
    Access,
    Trunk,
}

impl SwitchportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchportMode::Access => "access",
            SwitchportMode::Trunk => "trunk",
        }
    }
}

impl FromStr for SwitchportMode {
    type Err = ValidationError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "access" => Ok(SwitchportMode::Access),
            "trunk" => Ok(SwitchportMode::Trunk),
            other => Err(ValidationError::InvalidSwitchportMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor command vocabulary.
///
/// `None` means the platform has no equivalent and the operation is
/// reported as unsupported before any connection is made.
pub trait Dialect: Send + Sync {
    /// Enter/exit/save framing, or `None` when commands apply immediately.
    fn config_frame(&self) -> Option<ConfigFrame>;

    /// Tabular interface summary command.
    fn interface_brief(&self) -> Option<String>;

    /// Detailed single-interface command.
    fn interface_detail(&self, interface: &str) -> Option<String>;

    /// Full running configuration dump.
    fn running_config(&self) -> String;

    /// Assign an address to an interface.
    fn add_address(&self, interface: &str, address: &InterfaceAddress) -> ConfigScript;

    /// Set an interface description.
    fn set_description(&self, interface: &str, description: &str) -> ConfigScript;

    /// Administratively enable or disable an interface.
    fn set_enabled(&self, interface: &str, enabled: bool) -> ConfigScript;

    /// Configure a switchport.
    fn switchport(
        &self,
        interface: &str,
        mode: SwitchportMode,
        vlan: Option<u16>,
    ) -> Option<ConfigScript>;
}
