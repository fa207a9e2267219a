//! kredis-topology: Redis Cluster topology snapshots as typed values.
//!
//! Parses the text returned by `CLUSTER NODES` into an in-memory model
//! and formats it back. A cluster-management layer uses the model to
//! discover members, spot role changes and work out slot ownership.
//!
//! Everything here is a pure transform: no I/O, no shared state. Parsed
//! values are immutable and formatting is a deterministic function of
//! their contents, so `parse(format(x)) == x` for any parsed `x`.
//!
//! # Quick Start
//!
//! ```
//! use kredis_topology::{ClusterNodeList, EndpointGroup};
//!
//! let text = "\
//! e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 127.0.0.1:30001@31001 myself,master - 0 0 1 connected 0-16383
//! 07c37dfeb235213a872192d90877d0cd55635b91 127.0.0.1:30004@31004 slave e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 0 1426238317239 4 connected";
//!
//! let nodes = ClusterNodeList::parse(text).unwrap();
//! let me = nodes.myself().unwrap();
//! assert_eq!(me.slots.to_string(), "0-16383");
//!
//! // flags are written sorted: `myself,master` becomes `master,myself`
//! let formatted = nodes.to_string();
//! assert!(formatted.contains(" master,myself "));
//! assert_eq!(ClusterNodeList::parse(&formatted).unwrap(), nodes);
//!
//! let masters = EndpointGroup::parse("redis-0,redis-1:7001").unwrap();
//! assert_eq!(masters.to_string(), "redis-0:6379,redis-1:7001");
//! ```

mod address;
mod endpoint;
mod error;
mod flags;
mod slots;
mod source;
mod topology;

pub use address::NodeAddress;
pub use endpoint::{Endpoint, EndpointGroup, DEFAULT_PORT};
pub use error::{ParseError, QueryError, TopologyError};
pub use flags::{NodeFlag, NodeFlags, NO_FLAGS};
pub use slots::{key_slot, HashSlots, SlotRange, SLOT_COUNT};
pub use source::{load_topology, SnapshotSource, TopologyEvent};
pub use topology::{ClusterNode, ClusterNodeList, LinkState, NodeId};
