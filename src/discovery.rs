//! Per-scrape discovery of live entities.
//!
//! Nothing here is cached: every scrape re-discovers which client ids
//! exist and which secondary associations (topics, broker nodes) each one
//! currently has, so removed entities are naturally absent from the next
//! snapshot.

use std::collections::{BTreeSet, HashSet};

use crate::error::QueryError;
use crate::namespace::ManagementNamespace;
use crate::template::{CLIENT_ID_KEY, TagTuple};

/// Discovers the live tag tuples for one domain.
pub struct EntityDiscovery<'a> {
    namespace: &'a dyn ManagementNamespace,
    domain: &'a str,
}

impl<'a> EntityDiscovery<'a> {
    pub fn new(namespace: &'a dyn ManagementNamespace, domain: &'a str) -> Self {
        Self { namespace, domain }
    }

    /// Client ids currently registered under `group`.
    ///
    /// Queries `client-id=*,*` (open-ended, since entities in cross-schema
    /// groups carry a secondary tag as well) and dedupes the `client-id`
    /// tag of the returned descriptors.
    pub fn client_ids(&self, group: &str) -> Result<BTreeSet<String>, QueryError> {
        let pattern = format!("{}=*,*", CLIENT_ID_KEY);
        let descriptors = self.namespace.query(self.domain, group, &pattern)?;

        Ok(descriptors
            .iter()
            .filter_map(|d| d.tag(CLIENT_ID_KEY))
            .map(str::to_string)
            .collect())
    }

    /// Live `(client-id, secondary_key)` tuples under `group`.
    ///
    /// Two-stage: discover client ids, then query `client-id=<id>,*` per
    /// client and extract the pairs the registry actually returned. The
    /// union across clients contains only observed combinations - never a
    /// cartesian product assembled from independently discovered keys.
    pub fn associations(
        &self,
        group: &str,
        secondary_key: &str,
    ) -> Result<HashSet<TagTuple>, QueryError> {
        let mut tuples = HashSet::new();

        for client_id in self.client_ids(group)? {
            let pattern = format!("{}={},*", CLIENT_ID_KEY, client_id);
            let descriptors = self.namespace.query(self.domain, group, &pattern)?;

            for descriptor in descriptors {
                if let (Some(id), Some(secondary)) =
                    (descriptor.tag(CLIENT_ID_KEY), descriptor.tag(secondary_key))
                {
                    tuples.insert(TagTuple::new([
                        (CLIENT_ID_KEY, id),
                        (secondary_key, secondary),
                    ]));
                }
            }
        }

        Ok(tuples)
    }
}
