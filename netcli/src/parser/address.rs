//! IPv4 interface addresses and CIDR/netmask conversion.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ValidationError;

/// Prefix length assumed when an address is given without one.
pub const DEFAULT_PREFIX: u8 = 24;

/// Convert a CIDR prefix length into a dotted netmask.
///
/// `24` gives `255.255.255.0`, `0` gives `0.0.0.0`, `32` gives
/// `255.255.255.255`.
pub fn prefix_to_netmask(prefix: u8) -> Result<Ipv4Addr, ValidationError> {
    if prefix > 32 {
        return Err(ValidationError::InvalidPrefix(u32::from(prefix)));
    }
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    Ok(Ipv4Addr::from(mask))
}

/// An address to assign to an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: Ipv4Addr,
    pub prefix: u8,
    /// False when the caller gave a bare address and [`DEFAULT_PREFIX`]
    /// was applied.
    pub explicit_prefix: bool,
}

impl InterfaceAddress {
    /// Dotted netmask for the prefix.
    pub fn netmask(&self) -> Ipv4Addr {
        // prefix is validated on construction
        prefix_to_netmask(self.prefix).unwrap_or(Ipv4Addr::BROADCAST)
    }
}

impl FromStr for InterfaceAddress {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidAddress {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (ip, prefix) = match input.split_once('/') {
            Some((ip, prefix)) => (ip, Some(prefix)),
            None => (input, None),
        };

        let ip: Ipv4Addr = ip
            .parse()
            .map_err(|_| invalid("not a dotted IPv4 address"))?;

        match prefix {
            Some(prefix) => {
                let prefix: u32 = prefix
                    .parse()
                    .map_err(|_| invalid("prefix length is not a number"))?;
                if prefix > 32 {
                    return Err(ValidationError::InvalidPrefix(prefix));
                }
                Ok(Self {
                    ip,
                    prefix: prefix as u8,
                    explicit_prefix: true,
                })
            }
            None => Ok(Self {
                ip,
                prefix: DEFAULT_PREFIX,
                explicit_prefix: false,
            }),
        }
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix)
    }
}
