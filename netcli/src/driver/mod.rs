//! High-level device operations.
//!
//! The driver layer turns the interactive shell into the operations callers
//! use: single commands, configuration transactions, and the catalog of
//! interface operations.

mod builder;
mod catalog;
pub(crate) mod result;
pub mod sequencer;

pub use builder::DeviceBuilder;
pub use catalog::{BackupReport, ConfigReport, DeviceClient, InterfaceDetails};
pub use result::CommandResult;
pub use sequencer::{ConfigTransaction, TransactionReport, TransactionState, run_script};
