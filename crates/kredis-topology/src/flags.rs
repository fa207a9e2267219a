//! Node role and health flags.
//!
//! In CLUSTER NODES output the flags field is a comma-separated list such
//! as `myself,master` or `slave,fail?`. A node with no flags at all is
//! written as the literal `noflags`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Token written in place of an empty flag list.
pub const NO_FLAGS: &str = "noflags";

/// A single node flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeFlag {
    /// The node the snapshot was taken from.
    #[serde(rename = "myself")]
    Myself,
    #[serde(rename = "master")]
    Master,
    #[serde(rename = "slave")]
    Slave,
    /// Suspected failing by the local node (PFAIL).
    #[serde(rename = "fail?")]
    ProbableFail,
    /// Failure agreed on by a majority of masters.
    #[serde(rename = "fail")]
    Fail,
    /// Not yet part of the cluster; first contact in progress.
    #[serde(rename = "handshake")]
    Handshake,
    #[serde(rename = "noaddr")]
    NoAddress,
}

impl NodeFlag {
    pub const ALL: [NodeFlag; 7] = [
        NodeFlag::Myself,
        NodeFlag::Master,
        NodeFlag::Slave,
        NodeFlag::ProbableFail,
        NodeFlag::Fail,
        NodeFlag::Handshake,
        NodeFlag::NoAddress,
    ];

    /// Returns the protocol name of this flag.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeFlag::Myself => "myself",
            NodeFlag::Master => "master",
            NodeFlag::Slave => "slave",
            NodeFlag::ProbableFail => "fail?",
            NodeFlag::Fail => "fail",
            NodeFlag::Handshake => "handshake",
            NodeFlag::NoAddress => "noaddr",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        NodeFlag::ALL.into_iter().find(|flag| flag.as_str() == token)
    }
}

impl fmt::Display for NodeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of flags carried by a node.
///
/// An empty set is written as `noflags`. Non-empty sets are written with
/// their names sorted so formatting depends only on the set contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeFlags(BTreeSet<NodeFlag>);

impl NodeFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated flag list.
    ///
    /// A `noflags` token anywhere in the list makes the whole set empty,
    /// whatever else it contains.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut flags = BTreeSet::new();

        for token in s.split(',') {
            if token == NO_FLAGS {
                return Ok(Self::default());
            }
            let flag =
                NodeFlag::from_token(token).ok_or_else(|| ParseError::UnknownFlag(token.into()))?;
            flags.insert(flag);
        }

        Ok(Self(flags))
    }

    pub fn contains(&self, flag: NodeFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn insert(&mut self, flag: NodeFlag) -> bool {
        self.0.insert(flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeFlag> + '_ {
        self.0.iter().copied()
    }

    /// Returns true if the node is neither failed nor suspected failing.
    pub fn is_healthy(&self) -> bool {
        !self.contains(NodeFlag::Fail) && !self.contains(NodeFlag::ProbableFail)
    }
}

impl FromIterator<NodeFlag> for NodeFlags {
    fn from_iter<I: IntoIterator<Item = NodeFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for NodeFlags {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(NO_FLAGS);
        }

        let mut names: Vec<&str> = self.0.iter().map(|flag| flag.as_str()).collect();
        names.sort_unstable();
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_flag() {
        let flags = NodeFlags::parse("slave").unwrap();
        assert_eq!(flags.len(), 1);
        assert!(flags.contains(NodeFlag::Slave));
    }

    #[test]
    fn parse_every_flag_name() {
        for flag in NodeFlag::ALL {
            let parsed = NodeFlags::parse(flag.as_str()).unwrap();
            assert!(parsed.contains(flag), "{flag} did not parse");
        }
    }

    #[test]
    fn noflags_is_empty_set() {
        let flags = NodeFlags::parse("noflags").unwrap();
        assert!(flags.is_empty());
        assert_eq!(flags.to_string(), "noflags");
        assert_eq!(NodeFlags::new().to_string(), "noflags");
    }

    #[test]
    fn noflags_wins_when_mixed() {
        assert!(NodeFlags::parse("master,noflags").unwrap().is_empty());
        assert!(NodeFlags::parse("noflags,master").unwrap().is_empty());
    }

    #[test]
    fn unknown_flag_is_error() {
        assert_eq!(
            NodeFlags::parse("myself,primary"),
            Err(ParseError::UnknownFlag("primary".into()))
        );
        assert_eq!(NodeFlags::parse(""), Err(ParseError::UnknownFlag("".into())));
    }

    #[test]
    fn display_is_sorted_and_deduplicated() {
        let flags = NodeFlags::parse("slave,myself,fail?,fail,slave").unwrap();
        assert_eq!(flags.to_string(), "fail,fail?,myself,slave");
    }

    #[test]
    fn display_ignores_input_order() {
        let a = NodeFlags::parse("myself,master").unwrap();
        let b = NodeFlags::parse("master,myself").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "master,myself");
    }

    #[test]
    fn health() {
        assert!(NodeFlags::parse("master").unwrap().is_healthy());
        assert!(!NodeFlags::parse("master,fail?").unwrap().is_healthy());
        assert!(!NodeFlags::parse("slave,fail").unwrap().is_healthy());
    }

    #[test]
    fn serializes_as_protocol_names() {
        let flags = NodeFlags::parse("myself,fail?").unwrap();
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["myself","fail?"]"#);
    }
}
