//! Vendor-specific platform definitions.

pub mod cisco_ios;
pub mod mikrotik;
