//! Where snapshots come from, and what flows out to orchestration.
//!
//! The transport that runs CLUSTER NODES against a member lives outside
//! this crate. It only has to hand back the raw response text through
//! [`SnapshotSource`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::endpoint::EndpointGroup;
use crate::error::TopologyError;
use crate::topology::{ClusterNode, ClusterNodeList};

/// Produces the raw CLUSTER NODES text of one cluster member.
pub trait SnapshotSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_snapshot(&self) -> Result<String, Self::Error>;
}

impl<F, E> SnapshotSource for F
where
    F: Fn() -> Result<String, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn fetch_snapshot(&self) -> Result<String, E> {
        self()
    }
}

/// Fetches a snapshot and parses it into a node list.
///
/// The list is also checked to describe exactly one local node, so
/// callers can rely on [`ClusterNodeList::myself`] succeeding.
pub fn load_topology<S>(source: &S) -> Result<ClusterNodeList, TopologyError>
where
    S: SnapshotSource + ?Sized,
{
    let text = source.fetch_snapshot().map_err(|e| {
        warn!("failed to fetch cluster nodes snapshot: {e}");
        TopologyError::Fetch(Box::new(e))
    })?;
    debug!(bytes = text.len(), "fetched cluster nodes snapshot");

    let nodes = ClusterNodeList::parse(&text).map_err(|e| {
        warn!("discarding malformed cluster nodes snapshot: {e}");
        e
    })?;

    let myself = nodes.myself()?;
    debug!(
        nodes = nodes.len(),
        myself = %myself.id,
        "parsed cluster topology"
    );

    Ok(nodes)
}

/// A typed payload handed to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TopologyEvent {
    /// A freshly parsed CLUSTER NODES snapshot.
    Snapshot(ClusterNodeList),
    /// The configured master endpoints.
    Masters(EndpointGroup),
    /// The node a snapshot was taken from.
    LocalNode(ClusterNode),
    /// Where a key is routed: its slot and the node serving that slot.
    KeyRoute {
        key: String,
        slot: u16,
        owner: Option<ClusterNode>,
    },
}

impl TopologyEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TopologyEvent::Snapshot(_) => "snapshot",
            TopologyEvent::Masters(_) => "masters",
            TopologyEvent::LocalNode(_) => "local_node",
            TopologyEvent::KeyRoute { .. } => "key_route",
        }
    }
}
