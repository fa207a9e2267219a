//! Host/port endpoints and comma-separated endpoint groups.
//!
//! These are the addresses an operator configures for a cluster's masters,
//! e.g. `redis-0:7000,redis-1,redis-2:7002`. A missing port means the
//! standard Redis port.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Port assumed when an endpoint omits one.
pub const DEFAULT_PORT: &str = "6379";

/// A host/port pair identifying a Redis instance.
///
/// The port is kept as text. It is not validated as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
}

impl Endpoint {
    /// Creates an endpoint from its parts.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Parses `host` or `host:port`. Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let components: Vec<&str> = s.split(':').collect();
        let (host, port) = match components.as_slice() {
            [host] => (host.trim(), DEFAULT_PORT),
            [host, port] => (host.trim(), port.trim()),
            _ => {
                return Err(ParseError::TooManyComponents {
                    input: s.to_string(),
                    surplus: components[2..].iter().map(|c| c.to_string()).collect(),
                })
            }
        };

        if host.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        Ok(Self::new(host, port))
    }
}

impl FromStr for Endpoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// An ordered list of endpoints that belong to the same logical group,
/// such as the configured masters of a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointGroup(Vec<Endpoint>);

impl EndpointGroup {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self(endpoints)
    }

    /// Parses a comma-separated list of endpoints.
    ///
    /// Blank input yields an empty group: a cluster may not have any
    /// masters configured yet.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }

        s.split(',')
            .enumerate()
            .map(|(i, part)| Endpoint::parse(part).map_err(|e| ParseError::part(i, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Endpoint> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Endpoint] {
        &self.0
    }
}

impl FromStr for EndpointGroup {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EndpointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, endpoint) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{endpoint}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EndpointGroup {
    type Item = &'a Endpoint;
    type IntoIter = std::slice::Iter<'a, Endpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Endpoint> for EndpointGroup {
    fn from_iter<I: IntoIterator<Item = Endpoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_default_port() {
        let ep = Endpoint::parse("redis-0").unwrap();
        assert_eq!(ep, Endpoint::new("redis-0", "6379"));
        assert_eq!(ep.to_string(), "redis-0:6379");
    }

    #[test]
    fn endpoint_explicit_port() {
        let ep = Endpoint::parse("redis-0:7000").unwrap();
        assert_eq!(ep.host, "redis-0");
        assert_eq!(ep.port, "7000");
    }

    #[test]
    fn endpoint_trims_whitespace() {
        let ep: Endpoint = "  redis-0 : 7000 \n".parse().unwrap();
        assert_eq!(ep, Endpoint::new("redis-0", "7000"));
    }

    #[test]
    fn endpoint_empty_is_error() {
        assert_eq!(Endpoint::parse(""), Err(ParseError::EmptyInput));
        assert_eq!(Endpoint::parse("   "), Err(ParseError::EmptyInput));
        assert_eq!(Endpoint::parse(":7000"), Err(ParseError::EmptyInput));
    }

    #[test]
    fn endpoint_too_many_components() {
        let err = Endpoint::parse("a:b:c").unwrap_err();
        match err {
            ParseError::TooManyComponents { input, surplus } => {
                assert_eq!(input, "a:b:c");
                assert_eq!(surplus, vec!["c".to_string()]);
            }
            other => panic!("expected TooManyComponents, got {other:?}"),
        }
    }

    #[test]
    fn group_empty() {
        let group = EndpointGroup::parse("  ").unwrap();
        assert!(group.is_empty());
        assert_eq!(group.to_string(), "");
    }

    #[test]
    fn group_preserves_order() {
        let group = EndpointGroup::parse("redis-2:7002,redis-0,redis-1:7001").unwrap();
        let hosts: Vec<&str> = group.iter().map(|e| e.host.as_str()).collect();
        assert_eq!(hosts, ["redis-2", "redis-0", "redis-1"]);
        assert_eq!(group.to_string(), "redis-2:7002,redis-0:6379,redis-1:7001");
    }

    #[test]
    fn group_reparses_its_own_output() {
        let group = EndpointGroup::parse("a, b:1 ,c:2").unwrap();
        let again = EndpointGroup::parse(&group.to_string()).unwrap();
        assert_eq!(group, again);
    }

    #[test]
    fn group_reports_failing_part() {
        let err = EndpointGroup::parse("a:1,b:2:3,c").unwrap_err();
        match err {
            ParseError::Part { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, ParseError::TooManyComponents { .. }));
            }
            other => panic!("expected Part, got {other:?}"),
        }
    }

    #[test]
    fn group_empty_part_is_error() {
        let err = EndpointGroup::parse("a,,b").unwrap_err();
        assert_eq!(err, ParseError::part(1, ParseError::EmptyInput));
    }
}
