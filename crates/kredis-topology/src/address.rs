//! Node network addresses in `ip:port@cport` form.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The address a node advertises: client IP and port, plus the cluster
/// bus (gossip) port when known.
///
/// The IP is `None` when the host part is empty or is not a literal IP
/// address; nodes may be listed before their address is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeAddress {
    pub ip: Option<IpAddr>,
    pub port: String,
    /// Empty when the address carries no `@cport` suffix.
    pub cluster_port: String,
}

impl NodeAddress {
    /// Parses `<host>:<port>` or `<host>:<port>@<cport>`.
    ///
    /// `<host>` may be empty and must not contain `:`. Both ports are
    /// runs of ASCII digits and may be empty.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedAddress(s.to_string());

        let (host, rest) = s.split_once(':').ok_or_else(malformed)?;
        let (port, cluster_port) = match rest.split_once('@') {
            Some((port, cport)) => (port, cport),
            None => (rest, ""),
        };

        if !is_digits(port) || !is_digits(cluster_port) {
            return Err(malformed());
        }

        Ok(Self {
            ip: host.parse().ok(),
            port: port.to_string(),
            cluster_port: cluster_port.to_string(),
        })
    }

    /// Returns `ip:port` when the IP is known and the port is numeric.
    pub fn client_addr(&self) -> Option<std::net::SocketAddr> {
        let port = self.port.parse().ok()?;
        Some(std::net::SocketAddr::new(self.ip?, port))
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for NodeAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ip) = self.ip {
            write!(f, "{ip}")?;
        }
        write!(f, ":{}", self.port)?;
        if !self.cluster_port.is_empty() {
            write!(f, "@{}", self.cluster_port)?;
        }
        Ok(())
    }
}
