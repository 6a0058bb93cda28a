//! Ordered filter sets for query endpoints.

use std::collections::BTreeMap;

use opentargets_client::ParamValue;

/// An ordered set of filter parameters.
///
/// Keys are kept sorted so a filter set always renders to the same parameter
/// sequence, which keeps request URLs cache-stable.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    entries: BTreeMap<String, ParamValue>,
}

impl Filters {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, consuming and returning the set for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a filter in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// True when no filters are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of filters set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the filters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.entries.iter()
    }
}

impl IntoIterator for Filters {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
