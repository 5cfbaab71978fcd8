use std::fmt;
use ulid::Ulid;

/// Per-request identifier; ULIDs sort by creation time.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// The id carried by an `x-request-id` value, when it is a ULID.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Ulid::from_string(value.trim()).ok().map(Self)
    }

    /// Reuse the caller's id when it parses, otherwise mint a fresh one.
    #[must_use]
    pub fn from_header_or_new(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
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
