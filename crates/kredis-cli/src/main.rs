//! kredis-cli: inspect Redis Cluster topology snapshots.
//!
//! Reads the output of `CLUSTER NODES` from a file or stdin, parses it,
//! and prints the canonical form, the local node, slot ownership or a
//! coverage check. Pipe it straight from redis-cli:
//!
//! ```text
//! redis-cli -p 30001 cluster nodes | kredis-cli check
//! ```

mod config;
mod format;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use kredis_topology::{
    key_slot, load_topology, ClusterNodeList, EndpointGroup, TopologyError, TopologyEvent,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{parse_output_mode, parse_snapshot_input, OutputMode, SnapshotInput};
use crate::format::{format_node, format_slot_table, CheckReport};

/// Inspect Redis Cluster topology snapshots.
#[derive(Parser)]
#[command(name = "kredis-cli", version, about)]
struct Args {
    /// file holding CLUSTER NODES output. "-" or absent reads stdin
    #[arg(short, long, global = true, env = "KREDIS_SNAPSHOT")]
    file: Option<PathBuf>,

    /// output format: text or json
    #[arg(short, long, global = true, default_value = "text", env = "KREDIS_OUTPUT")]
    output: String,

    /// disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse the snapshot and print it in canonical form.
    Nodes,
    /// Print the node the snapshot was taken from.
    Myself,
    /// List masters with their slot ranges.
    Slots,
    /// Check that every slot is served and no node is failing.
    Check,
    /// Show the slot a key hashes to and the node serving it.
    Keyslot {
        /// the key to route
        key: String,
    },
    /// Parse a comma-separated master list and print it in canonical form.
    Masters {
        /// e.g. "redis-0,redis-1:7001"
        #[arg(env = "KREDIS_MASTERS", default_value = "")]
        group: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kredis=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    let mode = match parse_output_mode(&args.output) {
        Ok(mode) => mode,
        Err(e) => return fail(e),
    };

    let input = parse_snapshot_input(args.file.as_deref());
    match &args.command {
        Command::Masters { group } => run_masters(group, mode),
        command => match load(&input) {
            Ok(nodes) => {
                info!(
                    nodes = nodes.len(),
                    source = %input.describe(),
                    "loaded cluster topology"
                );
                run_snapshot_command(command, &nodes, mode)
            }
            Err(e) => fail(format!("{}: {e}", input.describe())),
        },
    }
}

fn run_snapshot_command(
    command: &Command,
    nodes: &ClusterNodeList,
    mode: OutputMode,
) -> ExitCode {
    match command {
        Command::Nodes => emit(
            mode,
            || TopologyEvent::Snapshot(nodes.clone()),
            || nodes.to_string(),
        ),
        Command::Myself => match nodes.myself() {
            Ok(me) => emit(mode, || TopologyEvent::LocalNode(me.clone()), || format_node(me)),
            Err(e) => fail(e.to_string()),
        },
        Command::Slots => emit(
            mode,
            || TopologyEvent::Snapshot(nodes.clone()),
            || format_slot_table(nodes),
        ),
        Command::Check => run_check(nodes, mode),
        Command::Keyslot { key } => run_keyslot(nodes, key, mode),
        Command::Masters { group } => run_masters(group, mode),
    }
}

/// Reads and parses the snapshot. Only `myself`-bearing snapshots are
/// accepted, matching what a cluster member reports about itself.
fn load(input: &SnapshotInput) -> Result<ClusterNodeList, TopologyError> {
    debug!(source = %input.describe(), "reading snapshot");
    let source = || input.read();
    load_topology(&source)
}

fn run_masters(group: &str, mode: OutputMode) -> ExitCode {
    match EndpointGroup::parse(group) {
        Ok(masters) => {
            let text = masters.to_string();
            emit(mode, move || TopologyEvent::Masters(masters), || text)
        }
        Err(e) => fail(format!("invalid master list: {e}")),
    }
}

/// Fails when a slot is unserved or a node is failing, in either output
/// mode.
fn run_check(nodes: &ClusterNodeList, mode: OutputMode) -> ExitCode {
    let report = CheckReport::from_nodes(nodes);
    let code = emit(mode, || &report, || report.render());
    if report.is_ok() {
        code
    } else {
        ExitCode::FAILURE
    }
}

fn run_keyslot(nodes: &ClusterNodeList, key: &str, mode: OutputMode) -> ExitCode {
    let slot = key_slot(key.as_bytes());
    let owner = nodes.slot_owner(slot);
    let code = emit(
        mode,
        || TopologyEvent::KeyRoute {
            key: key.to_string(),
            slot,
            owner: owner.cloned(),
        },
        || match owner {
            Some(owner) => format!("{slot} {} {}", owner.id, owner.address),
            None => slot.to_string(),
        },
    );
    match owner {
        Some(_) => code,
        None => fail(format!("slot {slot} is not assigned to any node")),
    }
}

/// Prints either the JSON form of the payload or the rendered text.
fn emit<T: Serialize>(
    mode: OutputMode,
    payload: impl FnOnce() -> T,
    render: impl FnOnce() -> String,
) -> ExitCode {
    match mode {
        OutputMode::Text => {
            println!("{}", render());
            ExitCode::SUCCESS
        }
        OutputMode::Json => {
            match serde_json::to_string_pretty(&payload()) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => fail(format!("failed to encode json output: {e}")),
            }
        }
    }
}

fn fail(msg: impl AsRef<str>) -> ExitCode {
    eprintln!("{}", format!("error: {}", msg.as_ref()).red());
    ExitCode::FAILURE
}
