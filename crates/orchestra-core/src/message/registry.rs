//! Name -> address registry.

use dashmap::DashMap;
use orchestra_types::address::Address;
use tracing::debug;

/// Single owner of every [`Address`] in a mesh.
///
/// The first lookup of a name allocates its address; later lookups return an
/// equal handle. Get-or-insert is atomic, so concurrent callers resolving the
/// same name never create two addresses.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    addresses: DashMap<String, Address>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, creating its address on first use.
    pub fn resolve(&self, name: &str) -> Address {
        self.addresses
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(name, "allocated address");
                Address::new(name)
            })
            .value()
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.addresses.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
