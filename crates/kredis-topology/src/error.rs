//! Error types for topology parsing and queries.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that can occur when parsing topology text.
///
/// Composite parsers stop at the first failing constituent and wrap it
/// with its position, so the innermost cause is always reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Required text was empty after trimming.
    #[error("input is empty")]
    EmptyInput,

    /// An endpoint had more than one `:` separator.
    #[error("parsing \"{input}\": too many components: {surplus:?}")]
    TooManyComponents { input: String, surplus: Vec<String> },

    /// One comma-separated part of an endpoint group failed to parse.
    #[error("parsing part {index}: {source}")]
    Part {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },

    /// A flag token is not one of the recognized names.
    #[error("unrecognized flag \"{0}\"")]
    UnknownFlag(String),

    /// Text does not have the `ip:port[@cport]` shape.
    #[error("\"{0}\" is not a valid cluster node address")]
    MalformedAddress(String),

    /// A slot token has more than one `-`, or a reversed range.
    #[error("parsing \"{0}\": unknown hash slot format")]
    UnknownFormat(String),

    /// A slot token names a slot at or past [`SLOT_COUNT`](crate::SLOT_COUNT).
    #[error("parsing \"{token}\": slot {slot} is out of range")]
    SlotOutOfRange { token: String, slot: u16 },

    /// A slot token component is not a valid slot number.
    #[error("parsing \"{token}\": {source}")]
    InvalidSlot {
        token: String,
        #[source]
        source: ParseIntError,
    },

    /// A node line carries fewer than the eight mandatory fields.
    #[error("expected at least 8 fields, got {0}")]
    TooFewFields(usize),

    /// One of the numeric node fields failed to parse.
    #[error("invalid {field}: {source}")]
    IntegerField {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },

    /// The link state field is neither `connected` nor `disconnected`.
    #[error("unknown link state \"{0}\"")]
    UnknownLinkState(String),

    /// A line of a node list failed to parse. `index` is 0-based and
    /// counts skipped blank lines.
    #[error("parsing line {index} of cluster nodes: {source}")]
    Line {
        index: usize,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn part(index: usize, source: ParseError) -> Self {
        ParseError::Part {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn line(index: usize, source: ParseError) -> Self {
        ParseError::Line {
            index,
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, skipping positional wrappers.
    pub fn root_cause(&self) -> &ParseError {
        match self {
            ParseError::Part { source, .. } | ParseError::Line { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

/// Errors from derived queries over a parsed node list.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// No node carries the `myself` flag.
    #[error("no `myself` node found")]
    NoSelfNode,

    /// More than one node carries the `myself` flag.
    #[error("can't have multiple `myself` nodes")]
    MultipleSelfNodes,
}

/// Errors from loading a topology through a [`SnapshotSource`].
///
/// [`SnapshotSource`]: crate::SnapshotSource
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The source could not produce snapshot text.
    #[error("fetching cluster nodes snapshot: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The snapshot text was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The snapshot did not describe exactly one local node.
    #[error(transparent)]
    Query(#[from] QueryError),
}
