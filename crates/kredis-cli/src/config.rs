//! Option parsing for the CLI.
//!
//! Converts CLI-friendly strings into the types the commands work with.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where the CLUSTER NODES text is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotInput {
    Stdin,
    File(PathBuf),
}

impl SnapshotInput {
    /// Reads the whole snapshot text.
    pub fn read(&self) -> io::Result<String> {
        match self {
            SnapshotInput::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
            SnapshotInput::File(path) => std::fs::read_to_string(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SnapshotInput::Stdin => "stdin".into(),
            SnapshotInput::File(path) => path.display().to_string(),
        }
    }
}

/// Resolves the `--file` option. Absent or `-` means stdin.
pub fn parse_snapshot_input(path: Option<&Path>) -> SnapshotInput {
    match path {
        None => SnapshotInput::Stdin,
        Some(p) if p == Path::new("-") => SnapshotInput::Stdin,
        Some(p) => SnapshotInput::File(p.to_path_buf()),
    }
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Parses an output mode name from a CLI string.
pub fn parse_output_mode(input: &str) -> Result<OutputMode, String> {
    match input.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputMode::Text),
        "json" => Ok(OutputMode::Json),
        _ => Err(format!(
            "unknown output mode '{input}'. valid options: text, json"
        )),
    }
}
