//! Tool definitions and dispatch.
//!
//! Each device operation is exposed as a named tool with a JSON schema
//! (returned by [`tool_definitions`]) and invoked through [`call_tool`].
//! This is the only place operation failures become text: a failed
//! operation is a successful tool call whose result has `isError` set.
//!
//! - `run_command`, `backup_running_config`
//! - `add_ip_address`, `set_interface_description`, `set_interface_status`,
//!   `configure_switchport`
//! - `list_interfaces`, `get_interface_details`

mod server;

pub use server::{ServeError, ToolServer};

use std::path::PathBuf;

use log::info;
use rmcp::model::{CallToolResult, Content};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use crate::driver::{BackupReport, DeviceClient};
use crate::error::{OperationError, OperationResult};
use crate::transport::Connector;

/// Text returned for a command that printed nothing.
const EMPTY_OUTPUT: &str = "Command executed successfully.";

/// Why a tool call could not be dispatched at all.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of a tool call, before conversion to the MCP wire type.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Text shown to the caller.
    pub text: String,
    /// Maps to `isError`.
    pub is_error: bool,
    /// Typed payload, sent as `structuredContent`.
    pub structured: Option<Value>,
}

impl ToolResult {
    fn success(text: impl Into<String>, structured: Option<Value>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            structured,
        }
    }

    fn failure(err: &OperationError, action: &str) -> Self {
        Self {
            text: err.render(action),
            is_error: true,
            structured: serde_json::to_value(err).ok(),
        }
    }

    /// MCP `tools/call` result: one text block plus structured content.
    pub fn into_call_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        let mut result = if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        };
        result.structured_content = self.structured;
        result
    }
}

#[derive(Deserialize)]
struct RunCommandArgs {
    command: String,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Deserialize)]
struct AddIpArgs {
    ip_address: String,
    interface: String,
}

#[derive(Deserialize)]
struct InterfaceArgs {
    interface_name: String,
}

#[derive(Deserialize)]
struct DescriptionArgs {
    interface_name: String,
    description: String,
}

#[derive(Deserialize)]
struct StatusArgs {
    interface_name: String,
    status: bool,
}

#[derive(Deserialize)]
struct SwitchportArgs {
    interface_name: String,
    mode: String,
    #[serde(default)]
    vlan: Option<u32>,
}

#[derive(Deserialize)]
struct BackupArgs {
    #[serde(default)]
    filename: Option<PathBuf>,
}

/// Schemas of every tool, in `tools/list` order.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "run_command",
            "description": "Execute a command on the network device and return its output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "Command to execute (e.g. 'show version')."
                    },
                    "host": {
                        "type": "string",
                        "description": "Target host. Omit to use the configured device."
                    }
                },
                "required": ["command"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "add_ip_address",
            "description": "Assign an IP address to an interface and save the configuration.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "ip_address": {
                        "type": "string",
                        "description": "Address with prefix length (e.g. '192.168.1.1/24'). A bare address gets /24."
                    },
                    "interface": {
                        "type": "string",
                        "description": "Interface name (e.g. 'GigabitEthernet0/0')."
                    }
                },
                "required": ["ip_address", "interface"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "list_interfaces",
            "description": "List all interfaces with address and status.",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }
        }),
        json!({
            "name": "get_interface_details",
            "description": "Get MAC address, MTU, bandwidth, description and packet counters of one interface.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "interface_name": {
                        "type": "string",
                        "description": "Interface name (e.g. 'GigabitEthernet0/0')."
                    }
                },
                "required": ["interface_name"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "set_interface_description",
            "description": "Set the description of an interface.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "interface_name": {
                        "type": "string",
                        "description": "Interface name (e.g. 'GigabitEthernet0/0')."
                    },
                    "description": {
                        "type": "string",
                        "description": "Single-line description text."
                    }
                },
                "required": ["interface_name", "description"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "set_interface_status",
            "description": "Enable or disable an interface.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "interface_name": {
                        "type": "string",
                        "description": "Interface name (e.g. 'GigabitEthernet0/0')."
                    },
                    "status": {
                        "type": "boolean",
                        "description": "true to enable, false to disable."
                    }
                },
                "required": ["interface_name", "status"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "configure_switchport",
            "description": "Configure an interface as an access or trunk switchport.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "interface_name": {
                        "type": "string",
                        "description": "Interface name (e.g. 'GigabitEthernet0/1')."
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["access", "trunk"],
                        "description": "Switchport mode."
                    },
                    "vlan": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 4094,
                        "description": "Access VLAN. Ignored in trunk mode."
                    }
                },
                "required": ["interface_name", "mode"],
                "additionalProperties": false
            }
        }),
        json!({
            "name": "backup_running_config",
            "description": "Fetch the running configuration, optionally saving it to a file.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "File to write the configuration to."
                    }
                },
                "additionalProperties": false
            }
        }),
    ]
}

/// Run the tool `name` with JSON `args` against `client`.
pub async fn call_tool<C: Connector>(
    client: &DeviceClient<C>,
    name: &str,
    args: Value,
) -> Result<ToolResult, ToolError> {
    info!("tool call: {}", name);
    let result = match name {
        "run_command" => {
            let args: RunCommandArgs = decode(name, args)?;
            render(
                client.run_command(&args.command, args.host.as_deref()).await,
                "execute command",
                |result| {
                    let text = if result.output.is_empty() {
                        EMPTY_OUTPUT.to_string()
                    } else {
                        result.output.clone()
                    };
                    (text, serde_json::to_value(result).ok())
                },
            )
        }
        "add_ip_address" => {
            let args: AddIpArgs = decode(name, args)?;
            render(
                client.add_ip_address(&args.ip_address, &args.interface).await,
                "add IP address",
                |report| (report.summary.clone(), serde_json::to_value(report).ok()),
            )
        }
        "list_interfaces" => {
            decode::<Value>(name, args)?;
            render(client.list_interfaces().await, "list interfaces", |interfaces| {
                let value = json!({ "interfaces": interfaces });
                (pretty(&value["interfaces"]), Some(value))
            })
        }
        "get_interface_details" => {
            let args: InterfaceArgs = decode(name, args)?;
            render(
                client.get_interface_details(&args.interface_name).await,
                "get interface details",
                |details| {
                    let value = serde_json::to_value(details).unwrap_or(Value::Null);
                    (pretty(&value), Some(value))
                },
            )
        }
        "set_interface_description" => {
            let args: DescriptionArgs = decode(name, args)?;
            render(
                client
                    .set_interface_description(&args.interface_name, &args.description)
                    .await,
                "set interface description",
                |report| (report.summary.clone(), serde_json::to_value(report).ok()),
            )
        }
        "set_interface_status" => {
            let args: StatusArgs = decode(name, args)?;
            render(
                client
                    .set_interface_status(&args.interface_name, args.status)
                    .await,
                "set interface status",
                |report| (report.summary.clone(), serde_json::to_value(report).ok()),
            )
        }
        "configure_switchport" => {
            let args: SwitchportArgs = decode(name, args)?;
            render(
                client
                    .configure_switchport(&args.interface_name, &args.mode, args.vlan)
                    .await,
                "configure switchport",
                |report| (report.summary.clone(), serde_json::to_value(report).ok()),
            )
        }
        "backup_running_config" => {
            let args: BackupArgs = decode(name, args)?;
            match client.backup_running_config(args.filename.as_deref()).await {
                Ok(backup) => render_backup(&backup),
                Err(e) => ToolResult::failure(&e, "backup configuration"),
            }
        }
        other => return Err(ToolError::UnknownTool(other.to_string())),
    };
    Ok(result)
}

fn decode<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    // Tools without parameters accept a missing arguments object
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn render<T>(
    result: OperationResult<T>,
    action: &str,
    success: impl FnOnce(&T) -> (String, Option<Value>),
) -> ToolResult {
    match result {
        Ok(value) => {
            let (text, structured) = success(&value);
            ToolResult::success(text, structured)
        }
        Err(e) => ToolResult::failure(&e, action),
    }
}

const TRUNCATION_WARNING: &str =
    "Warning: the device prompt did not return, the configuration may be incomplete.";

/// The write outcome is reported separately from the fetch.
fn render_backup(backup: &BackupReport) -> ToolResult {
    let structured = serde_json::to_value(backup).ok();
    let mut result = match (&backup.saved_to, &backup.write_error) {
        (_, Some(error)) => ToolResult {
            text: format!(
                "Failed to save configuration to file: {}\n\n{}",
                error, backup.config
            ),
            is_error: true,
            structured,
        },
        (Some(path), None) => ToolResult::success(
            format!("Configuration saved to {}", path.display()),
            structured,
        ),
        (None, None) => ToolResult::success(backup.config.clone(), structured),
    };
    if !backup.is_complete() {
        result.text = format!("{}\n\n{}", TRUNCATION_WARNING, result.text);
    }
    result
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Completion, WaitProfile};
    use crate::error::ErrorKind;
    use crate::platform::vendors;
    use crate::testing::{FakeConnector, fast_options, test_ssh_config};

    fn client(connector: &FakeConnector) -> DeviceClient<FakeConnector> {
        DeviceClient::new(
            connector.clone(),
            test_ssh_config(),
            vendors::cisco_ios::platform(),
            fast_options(),
            WaitProfile::default(),
        )
    }

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = tool_definitions()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "run_command",
                "add_ip_address",
                "list_interfaces",
                "get_interface_details",
                "set_interface_description",
                "set_interface_status",
                "configure_switchport",
                "backup_running_config",
            ]
        );
        for tool in tool_definitions() {
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_empty_output_message() {
        let connector = FakeConnector::new();
        let result = call_tool(&client(&connector), "run_command", json!({ "command": "clear counters" }))
            .await
            .unwrap();
        assert_eq!(result.text, "Command executed successfully.");
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_validation_rendering() {
        let connector = FakeConnector::new();
        let result = call_tool(
            &client(&connector),
            "configure_switchport",
            json!({ "interface_name": "Gi0/1", "mode": "routed" }),
        )
        .await
        .unwrap();

        assert!(result.is_error);
        assert_eq!(result.text, "Error: Mode must be 'access' or 'trunk', got 'routed'");
        assert_eq!(result.structured.unwrap()["kind"], "validation");
        assert_eq!(connector.log().connects, 0);
    }

    #[tokio::test]
    async fn test_connection_failure_rendering() {
        let connector = FakeConnector::new().refuse_connections();
        let result = call_tool(&client(&connector), "list_interfaces", Value::Null)
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.text.starts_with("Failed to list interfaces: "));
        assert_eq!(result.structured.unwrap()["kind"], "connection");
    }

    #[tokio::test]
    async fn test_list_interfaces_structured() {
        let connector = FakeConnector::new().reply(
            "show ip interface brief",
            "Interface  IP-Address  OK? Method Status Protocol\n\
             GigabitEthernet0/0  10.0.0.1  YES  manual  up  up",
        );
        let result = call_tool(&client(&connector), "list_interfaces", json!({}))
            .await
            .unwrap();

        let structured = result.structured.unwrap();
        assert_eq!(structured["interfaces"][0]["name"], "GigabitEthernet0/0");
        assert_eq!(structured["interfaces"][0]["ip_address"], "10.0.0.1");
        assert!(result.text.contains("\"method\": \"manual\""));
    }

    #[tokio::test]
    async fn test_bad_arguments() {
        let connector = FakeConnector::new();
        let err = call_tool(&client(&connector), "set_interface_status", json!({ "interface_name": "Gi0/1" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = call_tool(&client(&connector), "reload", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: reload");
    }

    #[test]
    fn test_backup_rendering() {
        let mut backup = BackupReport {
            config: "hostname Router".to_string(),
            completion: Completion::Prompt,
            saved_to: None,
            write_error: None,
        };
        assert_eq!(render_backup(&backup).text, "hostname Router");

        backup.saved_to = Some(PathBuf::from("/tmp/router.cfg"));
        assert_eq!(render_backup(&backup).text, "Configuration saved to /tmp/router.cfg");

        backup.saved_to = None;
        backup.write_error = Some("Permission denied (os error 13)".to_string());
        let result = render_backup(&backup);
        assert!(result.is_error);
        assert_eq!(
            result.text,
            "Failed to save configuration to file: Permission denied (os error 13)\n\nhostname Router"
        );
    }

    #[test]
    fn test_incomplete_backup_warns() {
        let backup = BackupReport {
            config: "Building configuration...".to_string(),
            completion: Completion::WaitElapsed,
            saved_to: Some(PathBuf::from("/tmp/router.cfg")),
            write_error: None,
        };
        let result = render_backup(&backup);
        assert!(!result.is_error);
        assert_eq!(
            result.text,
            format!("{TRUNCATION_WARNING}\n\nConfiguration saved to /tmp/router.cfg")
        );
        assert_eq!(result.structured.unwrap()["completion"], "wait_elapsed");
    }

    #[test]
    fn test_partial_output_rendering() {
        let err = OperationError {
            kind: ErrorKind::Channel,
            message: "Channel error: Channel closed".to_string(),
            partial_output: Some("% Invalid input detected".to_string()),
        };
        let result = ToolResult::failure(&err, "set interface status");
        assert_eq!(
            result.text,
            "Failed to set interface status: Channel error: Channel closed\n\nPartial output:\n% Invalid input detected"
        );
        let json = serde_json::to_value(result.into_call_result()).unwrap();
        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["structuredContent"]["kind"], "channel");
    }
}
