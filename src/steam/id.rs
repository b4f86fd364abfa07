//! Steam identifiers and their string form.
//!
//! A Steam ID is a 64-bit value. Lua numbers cannot hold every 64-bit integer
//! exactly, so IDs cross the script boundary as decimal strings.

use std::fmt;
use std::str::FromStr;

use crate::SteamworksError;

/// A 64-bit Steam identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    /// Wrap a raw 64-bit ID.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw 64-bit value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for SteamId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = SteamworksError;

    /// Parse a decimal ID. Only ASCII digits are accepted: no sign, no
    /// whitespace, no separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SteamworksError::InvalidSteamId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| SteamworksError::InvalidSteamId(s.to_string()))
    }
}
