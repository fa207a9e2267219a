//! Hash slot ownership.
//!
//! A node's trailing CLUSTER NODES fields list the slots it serves, with
//! contiguous runs folded into `low-high` tokens: `0-5460 6000 7000-7002`.
//! [`HashSlots`] holds the expanded, sorted slot numbers and folds them
//! back into runs when formatted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Total number of hash slots in a Redis cluster.
pub const SLOT_COUNT: u16 = 16384;

/// CRC16/XMODEM (polynomial 0x1021, zero init), as used by Redis for
/// key-to-slot mapping.
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Returns the part of the key that is hashed.
///
/// If the key contains a non-empty `{...}` section, only its content is
/// hashed, so `user:{42}:name` and `{42}` share a slot.
fn hash_tag(key: &[u8]) -> &[u8] {
    let Some(open) = key.iter().position(|&b| b == b'{') else {
        return key;
    };
    let after_open = &key[open + 1..];
    match after_open.iter().position(|&b| b == b'}') {
        Some(0) | None => key,
        Some(close) => &after_open[..close],
    }
}

/// Computes the hash slot for a key, in `0..SLOT_COUNT`.
pub fn key_slot(key: &[u8]) -> u16 {
    crc16(hash_tag(key)) % SLOT_COUNT
}

/// A contiguous run of slots, `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: u16,
    pub end: u16,
}

impl SlotRange {
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: u16, end: u16) -> Self {
        assert!(start <= end, "SlotRange requires start <= end");
        Self { start, end }
    }

    pub fn single(slot: u16) -> Self {
        Self::new(slot, slot)
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn contains(&self, slot: u16) -> bool {
        slot >= self.start && slot <= self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// The sorted, deduplicated set of slots a node serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashSlots(Vec<u16>);

impl HashSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `begin, begin+step, ...` up to and including `end`.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn from_range(begin: u16, end: u16, step: usize) -> Self {
        (begin..=end).step_by(step).collect()
    }

    /// Parses a single slot token: `N` or `LOW-HIGH`. Every slot must be
    /// below [`SLOT_COUNT`].
    ///
    /// The result is not merged with anything else; callers collecting
    /// several tokens gather them with [`HashSlots::from_tokens`].
    pub fn parse_token(token: &str) -> Result<Vec<u16>, ParseError> {
        let parse_slot = |part: &str| -> Result<u16, ParseError> {
            if part.starts_with('+') {
                return Err(ParseError::UnknownFormat(token.to_string()));
            }
            let slot = part.parse::<u16>().map_err(|source| ParseError::InvalidSlot {
                token: token.to_string(),
                source,
            })?;
            if slot >= SLOT_COUNT {
                return Err(ParseError::SlotOutOfRange {
                    token: token.to_string(),
                    slot,
                });
            }
            Ok(slot)
        };

        let parts: Vec<&str> = token.split('-').collect();
        match parts.as_slice() {
            [slot] => Ok(vec![parse_slot(*slot)?]),
            [low, high] => {
                let (low, high) = (parse_slot(*low)?, parse_slot(*high)?);
                if low > high {
                    return Err(ParseError::UnknownFormat(token.to_string()));
                }
                Ok((low..=high).collect())
            }
            _ => Err(ParseError::UnknownFormat(token.to_string())),
        }
    }

    /// Parses every token, then sorts and deduplicates once.
    pub fn from_tokens<'a, I>(tokens: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut slots = Vec::new();
        for token in tokens {
            slots.extend(Self::parse_token(token)?);
        }
        Ok(slots.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, slot: u16) -> bool {
        self.0.binary_search(&slot).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    /// Folds the slots into maximal contiguous runs.
    pub fn ranges(&self) -> Vec<SlotRange> {
        let mut ranges = Vec::new();
        let mut slots = self.0.iter().copied();

        let Some(first) = slots.next() else {
            return ranges;
        };

        let (mut start, mut last) = (first, first);
        for slot in slots {
            if last.checked_add(1) == Some(slot) {
                last = slot;
            } else {
                ranges.push(SlotRange::new(start, last));
                start = slot;
                last = slot;
            }
        }
        ranges.push(SlotRange::new(start, last));

        ranges
    }
}

impl FromIterator<u16> for HashSlots {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut slots: Vec<u16> = iter.into_iter().collect();
        slots.sort_unstable();
        slots.dedup();
        Self(slots)
    }
}

impl fmt::Display for HashSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{range}")?;
        }
        Ok(())
    }
}
