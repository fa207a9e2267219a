//! Cluster topology as reported by CLUSTER NODES.
//!
//! Each line of the output describes one node:
//!
//! ```text
//! <id> <ip:port@cport> <flags> <master> <ping-sent> <pong-recv> <config-epoch> <link-state> <slot> ...
//! ```
//!
//! [`ClusterNode`] models one such line and [`ClusterNodeList`] the whole
//! response. Both parse from and format back to the same text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::NodeAddress;
use crate::error::{ParseError, QueryError};
use crate::flags::{NodeFlag, NodeFlags};
use crate::slots::{key_slot, HashSlots, SlotRange, SLOT_COUNT};

/// Opaque node identifier, a 40-character hex string in practice.
///
/// An empty ID is written as `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an ID field. `-` and the empty field both mean no ID.
    pub fn parse(field: &str) -> Self {
        match field {
            "-" => Self::default(),
            id => Self::new(id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether the reporting node has a live cluster bus link to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Connected,
    Disconnected,
}

impl FromStr for LinkState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connected" => Ok(LinkState::Connected),
            "disconnected" => Ok(LinkState::Disconnected),
            other => Err(ParseError::UnknownLinkState(other.to_string())),
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Connected => write!(f, "connected"),
            LinkState::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// One node as described by a single CLUSTER NODES line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub id: NodeId,
    pub address: NodeAddress,
    pub flags: NodeFlags,
    /// The master this node replicates, if it is a replica.
    pub master_id: Option<NodeId>,
    /// Milliseconds timestamp of the last unacknowledged ping, or 0.
    pub ping_sent: u64,
    /// Milliseconds timestamp of the last pong received.
    pub pong_received: u64,
    /// Configuration epoch (used for conflict resolution).
    pub epoch: u64,
    pub link_state: LinkState,
    /// Slots served by this node. Empty for replicas.
    pub slots: HashSlots,
}

/// Number of fields every node line carries before its slots.
const FIXED_FIELDS: usize = 8;

impl ClusterNode {
    /// Parses one CLUSTER NODES line. Fields are separated by single
    /// spaces.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(' ').collect();
        if fields.len() < FIXED_FIELDS {
            return Err(ParseError::TooFewFields(fields.len()));
        }

        Ok(Self {
            id: NodeId::parse(fields[0]),
            address: NodeAddress::parse(fields[1])?,
            flags: NodeFlags::parse(fields[2])?,
            master_id: Some(NodeId::parse(fields[3])).filter(|id| !id.is_empty()),
            ping_sent: parse_integer(fields[4], "ping-sent")?,
            pong_received: parse_integer(fields[5], "pong-recv")?,
            epoch: parse_integer(fields[6], "config-epoch")?,
            link_state: fields[7].parse()?,
            slots: HashSlots::from_tokens(fields[FIXED_FIELDS..].iter().copied())?,
        })
    }

    pub fn is_myself(&self) -> bool {
        self.flags.contains(NodeFlag::Myself)
    }

    pub fn is_master(&self) -> bool {
        self.flags.contains(NodeFlag::Master)
    }

    pub fn is_replica(&self) -> bool {
        self.flags.contains(NodeFlag::Slave)
    }

    /// Returns true if the node is neither failed nor suspected failing.
    pub fn is_healthy(&self) -> bool {
        self.flags.is_healthy()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

fn parse_integer(field: &str, name: &'static str) -> Result<u64, ParseError> {
    field.parse().map_err(|source| ParseError::IntegerField {
        field: name,
        source,
    })
}

impl FromStr for ClusterNode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClusterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let master_id: &dyn fmt::Display = match &self.master_id {
            Some(id) => id,
            None => &"-",
        };
        write!(
            f,
            "{} {} {} {} {} {} {} {}",
            self.id,
            self.address,
            self.flags,
            master_id,
            self.ping_sent,
            self.pong_received,
            self.epoch,
            self.link_state,
        )?;
        if !self.slots.is_empty() {
            write!(f, " {}", self.slots)?;
        }
        Ok(())
    }
}

/// All nodes from one CLUSTER NODES response, in response order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterNodeList(Vec<ClusterNode>);

impl ClusterNodeList {
    pub fn new(nodes: Vec<ClusterNode>) -> Self {
        Self(nodes)
    }

    /// Parses a full CLUSTER NODES response.
    ///
    /// Blank lines are skipped. Errors carry the 0-based index of the
    /// offending line, counting the blank ones.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut nodes = Vec::new();

        for (index, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                continue;
            }
            let node = ClusterNode::parse(line).map_err(|e| ParseError::line(index, e))?;
            nodes.push(node);
        }

        Ok(Self(nodes))
    }

    /// Returns the node the snapshot was taken from.
    ///
    /// Exactly one node must carry the `myself` flag.
    pub fn myself(&self) -> Result<&ClusterNode, QueryError> {
        let mut found = None;
        for node in self.0.iter().filter(|n| n.is_myself()) {
            if found.is_some() {
                return Err(QueryError::MultipleSelfNodes);
            }
            found = Some(node);
        }
        found.ok_or(QueryError::NoSelfNode)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClusterNode> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ClusterNode] {
        &self.0
    }

    /// Looks a node up by ID.
    pub fn get(&self, id: &NodeId) -> Option<&ClusterNode> {
        self.0.iter().find(|n| &n.id == id)
    }

    /// Returns all master nodes.
    pub fn primaries(&self) -> impl Iterator<Item = &ClusterNode> {
        self.0.iter().filter(|n| n.is_master())
    }

    /// Returns all replica nodes.
    pub fn replicas(&self) -> impl Iterator<Item = &ClusterNode> {
        self.0.iter().filter(|n| n.is_replica())
    }

    /// Returns the replicas of a specific master.
    pub fn replicas_of<'a>(
        &'a self,
        master_id: &'a NodeId,
    ) -> impl Iterator<Item = &'a ClusterNode> {
        self.0
            .iter()
            .filter(move |n| n.master_id.as_ref() == Some(master_id))
    }

    /// Returns the first node that claims the given slot.
    pub fn slot_owner(&self, slot: u16) -> Option<&ClusterNode> {
        self.0.iter().find(|n| n.slots.contains(slot))
    }

    /// Returns the node serving the slot a key hashes to.
    pub fn key_owner(&self, key: &[u8]) -> Option<&ClusterNode> {
        self.slot_owner(key_slot(key))
    }

    /// Number of distinct slots claimed by any node.
    pub fn assigned_slot_count(&self) -> usize {
        self.coverage().iter().filter(|&&covered| covered).count()
    }

    /// Returns the slot ranges no node claims.
    pub fn uncovered_ranges(&self) -> Vec<SlotRange> {
        let uncovered: HashSlots = self
            .coverage()
            .iter()
            .enumerate()
            .filter(|(_, covered)| !**covered)
            .map(|(slot, _)| slot as u16)
            .collect();
        uncovered.ranges()
    }

    fn coverage(&self) -> Vec<bool> {
        let mut coverage = vec![false; SLOT_COUNT as usize];
        for slot in self.0.iter().flat_map(|n| n.slots.iter()) {
            if let Some(entry) = coverage.get_mut(slot as usize) {
                *entry = true;
            }
        }
        coverage
    }
}

impl FromStr for ClusterNodeList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClusterNodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ClusterNodeList {
    type Item = &'a ClusterNode;
    type IntoIter = std::slice::Iter<'a, ClusterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<ClusterNode> for ClusterNodeList {
    fn from_iter<I: IntoIterator<Item = ClusterNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
