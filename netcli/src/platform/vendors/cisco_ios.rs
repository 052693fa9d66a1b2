//! Cisco IOS / IOS-XE platform definition.
//!
//! Supports devices with the classic three-mode CLI:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Configuration mode with `(config*)#` prompt
//!
//! # Prompt Examples
//!
//! ```text
//! Router>                            # exec mode
//! Router#                            # privilege_exec mode
//! Router(config)#                    # configuration mode
//! Router(config-if)#                 # config sub-mode (interface)
//! ```

use std::sync::Arc;

use crate::parser::InterfaceAddress;
use crate::platform::{
    ConfigFrame, ConfigScript, Dialect, PlatformDefinition, PrivilegeLevel, SwitchportMode,
};

/// Platform name used in the registry.
pub const PLATFORM_NAME: &str = "cisco_ios";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?i)^[\w.\-@()/: ]{1,63}>\s*$")
        .expect("valid exec prompt");

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?i)^[\w.\-@/:]{1,63}#\s*$")
        .expect("valid privilege_exec prompt")
        .with_not_contains("(config");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?i)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,32}\)#\s*$",
    )
    .expect("valid configuration prompt");

    PlatformDefinition::new(PLATFORM_NAME, Arc::new(CiscoIos))
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
}

/// IOS command vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct CiscoIos;

impl Dialect for CiscoIos {
    fn config_frame(&self) -> Option<ConfigFrame> {
        Some(ConfigFrame {
            enter: "configure terminal".to_string(),
            exit: "end".to_string(),
            save: Some("write memory".to_string()),
        })
    }

    fn interface_brief(&self) -> Option<String> {
        Some("show ip interface brief".to_string())
    }

    fn interface_detail(&self, interface: &str) -> Option<String> {
        Some(format!("show interfaces {interface}"))
    }

    fn running_config(&self) -> String {
        "show running-config".to_string()
    }

    fn add_address(&self, interface: &str, address: &InterfaceAddress) -> ConfigScript {
        ConfigScript::scoped(
            format!("interface {interface}"),
            vec![
                format!("ip address {} {}", address.ip, address.netmask()),
                "no shutdown".to_string(),
            ],
        )
    }

    fn set_description(&self, interface: &str, description: &str) -> ConfigScript {
        ConfigScript::scoped(
            format!("interface {interface}"),
            vec![format!("description {description}")],
        )
    }

    fn set_enabled(&self, interface: &str, enabled: bool) -> ConfigScript {
        let command = if enabled { "no shutdown" } else { "shutdown" };
        ConfigScript::scoped(format!("interface {interface}"), vec![command.to_string()])
    }

    fn switchport(
        &self,
        interface: &str,
        mode: SwitchportMode,
        vlan: Option<u16>,
    ) -> Option<ConfigScript> {
        // Mode must precede the VLAN assignment
        let mut commands = vec!["switchport".to_string(), format!("switchport mode {mode}")];
        if let (SwitchportMode::Access, Some(vlan)) = (mode, vlan) {
            commands.push(format!("switchport access vlan {vlan}"));
        }
        Some(ConfigScript::scoped(format!("interface {interface}"), commands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_ios");
        assert_eq!(platform.privilege_levels.len(), 3);
        assert_eq!(platform.on_open_commands, vec!["terminal length 0"]);
    }

    #[test]
    fn test_prompt_matches() {
        let platform = platform();
        let exec = platform.get_privilege("exec").unwrap();
        assert!(exec.matches("Router>"));
        assert!(!exec.matches("Router#"));

        let privileged = platform.get_privilege("privilege_exec").unwrap();
        assert!(privileged.matches("csr1000v-1#"));
        assert!(!privileged.matches("csr1000v-1(config)#"));

        let config = platform.get_privilege("configuration").unwrap();
        assert!(config.matches("csr1000v-1(config)#"));
        assert!(config.matches("csr1000v-1(config-if)#"));
    }

    #[test]
    fn test_add_address_script() {
        let address: InterfaceAddress = "192.168.1.1/24".parse().unwrap();
        let script = CiscoIos.add_address("GigabitEthernet0/0", &address);
        assert_eq!(script.scope.as_deref(), Some("interface GigabitEthernet0/0"));
        assert_eq!(
            script.commands,
            vec!["ip address 192.168.1.1 255.255.255.0", "no shutdown"]
        );
    }

    #[test]
    fn test_switchport_script_order() {
        let script = CiscoIos
            .switchport("Gi0/1", SwitchportMode::Access, Some(10))
            .unwrap();
        assert_eq!(
            script.commands,
            vec![
                "switchport",
                "switchport mode access",
                "switchport access vlan 10"
            ]
        );

        // Trunk ignores the access VLAN
        let script = CiscoIos
            .switchport("Gi0/1", SwitchportMode::Trunk, Some(10))
            .unwrap();
        assert_eq!(script.commands, vec!["switchport", "switchport mode trunk"]);
    }

    #[test]
    fn test_status_script() {
        assert_eq!(CiscoIos.set_enabled("Gi0/1", true).commands, vec!["no shutdown"]);
        assert_eq!(CiscoIos.set_enabled("Gi0/1", false).commands, vec!["shutdown"]);
    }
}
