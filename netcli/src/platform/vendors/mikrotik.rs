//! MikroTik RouterOS platform definition.
//!
//! RouterOS has no configuration mode: every command takes effect and is
//! persisted immediately, so scripts run without enter/exit/save framing.
//! Its `print` output is not the IOS table format, so interface listing and
//! detail extraction are not offered.
//!
//! ```text
//! [admin@MikroTik] >
//! [admin@MikroTik] /ip address>
//! ```

use std::sync::Arc;

use crate::parser::InterfaceAddress;
use crate::platform::{
    ConfigFrame, ConfigScript, Dialect, PlatformDefinition, PrivilegeLevel, SwitchportMode,
};

/// Platform name used in the registry.
pub const PLATFORM_NAME: &str = "mikrotik_routeros";

/// Create the RouterOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"^\[[^\]\r\n]+\]\s*(/[\w/ \-]*)?>\s*$")
        .expect("valid RouterOS prompt");

    PlatformDefinition::new(PLATFORM_NAME, Arc::new(RouterOs))
        .with_privilege(exec)
        .with_default_privilege("exec")
        .with_failure_pattern("bad command name")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("failure:")
        .with_failure_pattern("no such item")
}

/// RouterOS command vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct RouterOs;

/// RouterOS string literal: backslashes and quotes escaped.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn find(interface: &str) -> String {
    format!("[find name={}]", quote(interface))
}

impl Dialect for RouterOs {
    fn config_frame(&self) -> Option<ConfigFrame> {
        None
    }

    fn interface_brief(&self) -> Option<String> {
        None
    }

    fn interface_detail(&self, _interface: &str) -> Option<String> {
        None
    }

    fn running_config(&self) -> String {
        "/export".to_string()
    }

    fn add_address(&self, interface: &str, address: &InterfaceAddress) -> ConfigScript {
        ConfigScript::unscoped(vec![format!(
            "/ip address add address={address} interface={}",
            quote(interface)
        )])
    }

    fn set_description(&self, interface: &str, description: &str) -> ConfigScript {
        ConfigScript::unscoped(vec![format!(
            "/interface set {} comment={}",
            find(interface),
            quote(description)
        )])
    }

    fn set_enabled(&self, interface: &str, enabled: bool) -> ConfigScript {
        let verb = if enabled { "enable" } else { "disable" };
        ConfigScript::unscoped(vec![format!("/interface {verb} {}", find(interface))])
    }

    fn switchport(
        &self,
        _interface: &str,
        _mode: SwitchportMode,
        _vlan: Option<u16>,
    ) -> Option<ConfigScript> {
        None
    }
}
