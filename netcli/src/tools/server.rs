//! MCP tool server over stdio.

use log::{debug, info, warn};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::io;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use thiserror::Error;

use super::tool_definitions;
use crate::driver::DeviceClient;
use crate::transport::Connector;

/// Why the server stopped abnormally.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to start tool server: {0}")]
    Initialize(String),

    #[error("Tool server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Serves the device tools to one MCP client.
pub struct ToolServer<C: Connector> {
    client: DeviceClient<C>,
    tools: Vec<Tool>,
}

impl<C: Connector + 'static> ToolServer<C> {
    pub fn new(client: DeviceClient<C>) -> Self {
        let tools = tool_definitions().into_iter().filter_map(to_tool).collect();
        Self { client, tools }
    }

    /// Serve on the process's stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<(), ServeError> {
        info!("serving {} tools over stdio", self.tools.len());
        let service = self
            .serve(io::stdio())
            .await
            .map_err(|e| ServeError::Initialize(e.to_string()))?;
        let reason = service.waiting().await?;
        debug!("tool server stopped: {:?}", reason);
        Ok(())
    }
}

impl<C: Connector + 'static> ServerHandler for ToolServer<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "Operations on the {} device at {}.",
                self.client.platform().name,
                self.client.config().socket_addr()
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools.clone()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        match super::call_tool(&self.client, &request.name, arguments).await {
            Ok(result) => Ok(result.into_call_result()),
            Err(e) => {
                warn!("rejected tool call: {}", e);
                Err(McpError::invalid_params(e.to_string(), None))
            }
        }
    }
}

fn to_tool(definition: Value) -> Option<Tool> {
    let name = definition.get("name")?.as_str()?.to_string();
    let description = definition.get("description")?.as_str()?.to_string();
    let schema = definition.get("inputSchema")?.as_object()?.clone();
    Some(Tool::new(name, description, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::WaitProfile;
    use crate::platform::vendors;
    use crate::testing::{FakeConnector, fast_options, test_ssh_config};
    use serde_json::json;
    use tokio::io::{
        AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
    };

    /// Line-oriented JSON-RPC peer talking to a running server.
    struct TestClient {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl TestClient {
        async fn send(&mut self, message: Value) {
            let mut line = message.to_string();
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }

        async fn receive(&mut self) -> Value {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }

        async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
            self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
                .await;
            let response = self.receive().await;
            assert_eq!(response["id"], id);
            response
        }
    }

    async fn start(connector: &FakeConnector) -> TestClient {
        let server = ToolServer::new(DeviceClient::new(
            connector.clone(),
            test_ssh_config(),
            vendors::cisco_ios::platform(),
            fast_options(),
            WaitProfile::default(),
        ));
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            if let Ok(service) = server.serve(tokio::io::split(server_io)).await {
                let _ = service.waiting().await;
            }
        });

        let (reader, writer) = tokio::io::split(client_io);
        let mut client = TestClient {
            lines: BufReader::new(reader).lines(),
            writer,
        };
        let response = client
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "netcli-test", "version": "0.1.0" },
                }),
            )
            .await;
        assert_eq!(response["result"]["serverInfo"]["name"], "netcli");
        assert!(response["result"]["capabilities"]["tools"].is_object());
        client
            .send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
            .await;
        client
    }

    #[test]
    fn test_definitions_convert() {
        let server = ToolServer::new(DeviceClient::new(
            FakeConnector::new(),
            test_ssh_config(),
            vendors::cisco_ios::platform(),
            fast_options(),
            WaitProfile::default(),
        ));
        assert_eq!(server.tools.len(), tool_definitions().len());
        assert_eq!(server.tools[0].name, "run_command");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let mut client = start(&FakeConnector::new()).await;
        let response = client.request(1, "tools/list", json!({})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert!(tools.iter().any(|t| t["name"] == "backup_running_config"));
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["command"]));
    }

    #[tokio::test]
    async fn test_run_command_call() {
        let connector = FakeConnector::new().reply("show clock", "*10:00:00.000 UTC");
        let mut client = start(&connector).await;
        let response = client
            .request(
                2,
                "tools/call",
                json!({ "name": "run_command", "arguments": { "command": "show clock" } }),
            )
            .await;

        assert_eq!(response["result"]["content"][0]["text"], "*10:00:00.000 UTC");
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(connector.log().close_count, 1);
    }

    #[tokio::test]
    async fn test_tool_failure_is_not_protocol_error() {
        let connector = FakeConnector::new();
        let mut client = start(&connector).await;
        let response = client
            .request(
                3,
                "tools/call",
                json!({
                    "name": "configure_switchport",
                    "arguments": { "interface_name": "Gi0/1", "mode": "hybrid" },
                }),
            )
            .await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Error: Mode must be 'access' or 'trunk', got 'hybrid'"
        );
        assert_eq!(connector.log().connects, 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let mut client = start(&FakeConnector::new()).await;
        let response = client
            .request(4, "tools/call", json!({ "name": "reload", "arguments": {} }))
            .await;

        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(response["error"]["message"], "Unknown tool: reload");
    }
}
