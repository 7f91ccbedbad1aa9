//! Participant addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique address of a participant on the message router.
///
/// Addresses are immutable value objects compared by name. They are handed
/// out by the address registry, which guarantees one address per name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address {
    name: String,
}

impl Address {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The router key for this participant.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_name() {
        assert_eq!(Address::new("market"), Address::new("market"));
        assert_ne!(Address::new("market"), Address::new("design"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Address::new("gtm")).unwrap();
        assert_eq!(json, "\"gtm\"");
    }
}
