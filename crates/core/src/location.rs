//! Location tags for checked stack operations
//!
//! The code generator tags every check site with the name of the generated
//! block and, optionally, the source position of the instruction inside it.
//! Both shapes render through the same `Display` impl:
//!
//! ```text
//! block_A
//! block_A (prog.ws:3:5)
//! ```

use std::fmt;

/// Borrowed location tag, valid for the duration of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub block: &'a str,
    pub position: Option<&'a str>,
}

impl<'a> Location<'a> {
    /// A single-part tag naming only the block
    pub const fn block(block: &'a str) -> Self {
        Location {
            block,
            position: None,
        }
    }

    /// A two-part tag naming the block and the instruction position
    pub const fn at(block: &'a str, position: &'a str) -> Self {
        Location {
            block,
            position: Some(position),
        }
    }

    pub fn to_owned_location(&self) -> OwnedLocation {
        OwnedLocation {
            block: self.block.to_string(),
            position: self.position.map(str::to_string),
        }
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} ({})", self.block, pos),
            None => f.write_str(self.block),
        }
    }
}

impl<'a> From<&'a str> for Location<'a> {
    fn from(block: &'a str) -> Self {
        Location::block(block)
    }
}

impl From<Location<'_>> for OwnedLocation {
    fn from(loc: Location<'_>) -> Self {
        loc.to_owned_location()
    }
}

/// Owned copy of a [`Location`], carried by errors that outlive the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedLocation {
    pub block: String,
    pub position: Option<String>,
}

impl OwnedLocation {
    pub fn as_location(&self) -> Location<'_> {
        Location {
            block: &self.block,
            position: self.position.as_deref(),
        }
    }
}

impl fmt::Display for OwnedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_location().fmt(f)
    }
}
