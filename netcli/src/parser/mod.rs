//! Stateless extraction of structured fields from device text.

mod address;
mod interfaces;

pub use address::{DEFAULT_PREFIX, InterfaceAddress, prefix_to_netmask};
pub use interfaces::{InterfaceRecord, parse_interface_brief, parse_interface_detail};
