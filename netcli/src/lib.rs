//! # netcli
//!
//! Async command engine for network devices that only offer an interactive
//! CLI over SSH.
//!
//! Device output is an unframed byte stream, so netcli drives a PTY shell,
//! decides when each command's output is complete (prompt match, idle
//! timeout, or a fixed wait), scrapes interface fields out of the text, and
//! wraps configuration changes in transactions that always try to leave
//! configuration mode.
//!
//! ## Features
//!
//! - Async SSH connections via russh, one session per operation
//! - Prompt-driven output completion, with idle and fixed-wait fallbacks
//! - Cisco IOS and MikroTik RouterOS command dialects
//! - Typed operation results with machine-readable error kinds
//! - An MCP tool server exposing the operations over stdio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netcli::DeviceBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netcli::Error> {
//!     let client = DeviceBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .platform("cisco_ios")
//!         .build()?;
//!
//!     match client.set_interface_description("Gi0/1", "Uplink to Core").await {
//!         Ok(report) => println!("{}", report.summary),
//!         Err(e) => eprintln!("{}", e.render("set interface description")),
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod parser;
pub mod platform;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use channel::{Completion, InteractiveShell, ReadStrategy, ShellOptions, WaitProfile};
pub use driver::{
    BackupReport, CommandResult, ConfigReport, DeviceBuilder, DeviceClient, InterfaceDetails,
};
pub use error::{Error, ErrorKind, OperationError, OperationResult};
pub use parser::InterfaceRecord;
pub use platform::{PlatformDefinition, PlatformRegistry, PrivilegeLevel};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
