//! Scan target validation.
//!
//! nmap does its own resolution and range expansion, so targets are only
//! checked for shape before they reach the command line:
//! - Single IP addresses (IPv4 and IPv6)
//! - CIDR notation (192.168.1.0/24)
//! - nmap octet ranges (192.168.1.1-20, 10.0.0-3.*)
//! - Hostnames (example.com)

use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("target {0:?} looks like a command-line option")]
    OptionLike(String),
}

/// A single target expression as nmap accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
    /// An IPv4 octet range such as `192.168.1.1-20`.
    OctetRange(String),
    /// A hostname, resolved by nmap.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if s.starts_with('-') {
            return Err(TargetError::OptionLike(s.to_string()));
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;
            return Ok(Self::Cidr(network));
        }

        if is_octet_range(s) {
            return Ok(Self::OctetRange(s.to_string()));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Whether this target can cover more than one host.
    pub fn is_multi_host(&self) -> bool {
        match self {
            Self::Single(_) | Self::Hostname(_) => false,
            Self::Cidr(network) => network.prefix() < if network.is_ipv4() { 32 } else { 128 },
            Self::OctetRange(_) => true,
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::OctetRange(range) => write!(f, "{}", range),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Four dot-separated octet expressions, each a number, `a-b`, a list, or `*`,
/// with at least one of them not a plain number.
fn is_octet_range(s: &str) -> bool {
    let octets: Vec<&str> = s.split('.').collect();
    if octets.len() != 4 {
        return false;
    }

    let valid = octets.iter().all(|octet| {
        *octet == "*"
            || octet.split(',').all(|part| {
                let mut bounds = part.splitn(2, '-');
                bounds.all(|b| b.parse::<u8>().is_ok())
            })
    });

    valid && octets.iter().any(|o| o.parse::<u8>().is_err())
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().map_or(false, |c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().last().map_or(false, |c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}
