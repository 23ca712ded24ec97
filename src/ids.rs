//! Request identifiers.

use std::fmt;
use std::str::FromStr;

/// ULID-backed request identifier, carried through routing and logs so a
/// request can be correlated across dispatch events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Adopt an inbound `x-request-id` header value when it parses as a
    /// ULID; mint a new identifier otherwise.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        match header_value.map(str::parse) {
            Some(Ok(id)) => id,
            _ => Self::new(),
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}
