//! Human-readable rendering of parsed topology.
//!
//! Output style follows redis-cli `--cluster check`: one line per node,
//! role in color, slot ranges and counts after the address.

use colored::Colorize;
use kredis_topology::{ClusterNode, ClusterNodeList, SlotRange, SLOT_COUNT};
use serde::Serialize;

/// Shortened ID length used in tables.
const SHORT_ID_LEN: usize = 8;

/// Formats a single node as a short multi-line summary.
pub fn format_node(node: &ClusterNode) -> String {
    let mut out = format!(
        "{} {}\n",
        role_label(node),
        node.id.to_string().bold()
    );
    out.push_str(&format!("  address:  {}\n", node.address));
    out.push_str(&format!("  flags:    {}\n", node.flags));
    if let Some(master) = &node.master_id {
        out.push_str(&format!("  master:   {master}\n"));
    }
    out.push_str(&format!("  epoch:    {}\n", node.epoch));
    out.push_str(&format!("  link:     {}\n", node.link_state));
    if node.slots.is_empty() {
        out.push_str(&format!("  slots:    {}", "(none)".dimmed()));
    } else {
        out.push_str(&format!(
            "  slots:    {} ({} slots)",
            node.slots,
            node.slot_count()
        ));
    }
    out
}

/// Formats a table of masters with their slot ranges and replica counts.
pub fn format_slot_table(nodes: &ClusterNodeList) -> String {
    let mut lines = Vec::new();

    for primary in nodes.primaries() {
        let replicas = nodes.replicas_of(&primary.id).count();
        let slots = if primary.slots.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            primary.slots.to_string()
        };
        lines.push(format!(
            "{} {} {} slots:{} replicas:{}",
            truncate_id(primary.id.as_str(), SHORT_ID_LEN).bold(),
            primary.address,
            slots,
            primary.slot_count(),
            replicas,
        ));
    }

    if lines.is_empty() {
        return "no master nodes found".yellow().to_string();
    }
    lines.join("\n")
}

/// Result of checking a snapshot for slot coverage and failing nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub node_count: usize,
    pub primary_count: usize,
    pub assigned_slots: usize,
    pub uncovered: Vec<SlotRange>,
    /// `id (address)` of every node flagged `fail` or `fail?`.
    pub failing: Vec<String>,
}

impl CheckReport {
    pub fn from_nodes(nodes: &ClusterNodeList) -> Self {
        let failing = nodes
            .iter()
            .filter(|n| !n.is_healthy())
            .map(|n| format!("{} ({})", n.id, n.address))
            .collect();

        Self {
            node_count: nodes.len(),
            primary_count: nodes.primaries().count(),
            assigned_slots: nodes.assigned_slot_count(),
            uncovered: nodes.uncovered_ranges(),
            failing,
        }
    }

    /// True when every slot is served and no node is failing.
    pub fn is_ok(&self) -> bool {
        self.uncovered.is_empty() && self.failing.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = format!(
            "nodes: {} ({} masters)\nslots: {}/{} assigned\n",
            self.node_count, self.primary_count, self.assigned_slots, SLOT_COUNT
        );

        if !self.uncovered.is_empty() {
            let ranges: Vec<String> = self.uncovered.iter().map(|r| r.to_string()).collect();
            out.push_str(&format!(
                "{} uncovered slots: {}\n",
                "[ERR]".red(),
                ranges.join(", ")
            ));
        }

        for node in &self.failing {
            out.push_str(&format!("{} failing node: {node}\n", "[ERR]".red()));
        }

        if self.is_ok() {
            out.push_str(&format!("{} all slots covered", "[OK]".green()));
        } else {
            out.push_str(&format!("{} cluster check failed", "[ERR]".red()));
        }
        out
    }
}

fn role_label(node: &ClusterNode) -> String {
    if node.is_master() {
        "M:".green().to_string()
    } else if node.is_replica() {
        "S:".cyan().to_string()
    } else {
        "?:".yellow().to_string()
    }
}

/// Truncates a string to at most `max_len` bytes on a char boundary.
fn truncate_id(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
