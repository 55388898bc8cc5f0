//! Per-scrape orchestration: discovery, expansion, resolution.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::warn;

use crate::discovery::EntityDiscovery;
use crate::mapping;
use crate::namespace::ManagementNamespace;
use crate::resolver;
use crate::template::{RoleCatalog, TagSchema, TagTuple};

/// One labeled value within a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Label values in the family's label order, verbatim.
    pub label_values: Vec<String>,
    pub value: f64,
}

/// Exposition-facing grouping of samples sharing one external name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
    pub samples: Vec<MetricSample>,
}

/// Scrapes one role's catalog against the management namespace.
///
/// Holds no mutable state: the catalog is immutable and every call to
/// [`collect`] re-discovers the live population from scratch, so
/// concurrent scrapes need no synchronization and each produces an
/// independent snapshot.
///
/// [`collect`]: NamespaceCollector::collect
pub struct NamespaceCollector {
    catalog: RoleCatalog,
    namespace: Arc<dyn ManagementNamespace>,
}

impl NamespaceCollector {
    pub fn new(catalog: RoleCatalog, namespace: Arc<dyn ManagementNamespace>) -> Self {
        Self { catalog, namespace }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Produce one complete metrics snapshot.
    ///
    /// Per-group discovery failures and per-descriptor read failures never
    /// propagate: the group (or sample) is simply absent from the output.
    /// No ordering guarantee is made across or within groups.
    pub fn collect(&self) -> Vec<MetricFamily> {
        let domain = self.catalog.domain();
        let discovery = EntityDiscovery::new(self.namespace.as_ref(), domain);

        let mut families: Vec<MetricFamily> = Vec::new();
        // The same (group, attribute) may be declared under more than one
        // schema; families are keyed by name plus label arity so the two
        // granularities never mix samples.
        let mut by_key: HashMap<(String, usize), usize> = HashMap::new();

        for (group, schema) in self.catalog.group_schemas() {
            let tuples = self.discover_tuples(&discovery, group, schema);
            if tuples.is_empty() {
                continue;
            }

            for descriptor in self.catalog.expand(group, &tuples) {
                let Some(value) = resolver::resolve(self.namespace.as_ref(), domain, &descriptor)
                else {
                    continue;
                };

                let name = mapping::metric_name(domain, group, &descriptor.template.attribute);
                let label_names = mapping::label_names(&descriptor.template.schema);
                let index = *by_key
                    .entry((name.clone(), label_names.len()))
                    .or_insert_with(|| {
                        families.push(MetricFamily {
                            name,
                            help: descriptor.template.help.clone(),
                            label_names,
                            samples: Vec::new(),
                        });
                        families.len() - 1
                    });

                families[index].samples.push(MetricSample {
                    label_values: descriptor.tags.values(),
                    value,
                });
            }
        }

        families
    }

    /// Live tuples for one `(group, schema)` pair.
    ///
    /// A malformed pattern is a defect isolated to this group: it yields
    /// an empty set here and the scrape continues with the other groups.
    fn discover_tuples(
        &self,
        discovery: &EntityDiscovery<'_>,
        group: &str,
        schema: &TagSchema,
    ) -> HashSet<TagTuple> {
        let result = match schema.secondary_key() {
            None => discovery
                .client_ids(group)
                .map(|ids| ids.into_iter().map(TagTuple::client).collect()),
            Some(secondary_key) => discovery.associations(group, secondary_key),
        };

        match result {
            Ok(tuples) => tuples,
            Err(err) => {
                warn!(group, error = %err, "discovery failed, skipping group");
                HashSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Descriptor, InProcessNamespace};
    use crate::template::CLIENT_ID_KEY;

    const DOMAIN: &str = "example.producer";

    fn catalog() -> RoleCatalog {
        RoleCatalog::builder(DOMAIN)
            .schema("per-client", [CLIENT_ID_KEY])
            .schema("per-topic", [CLIENT_ID_KEY, "topic"])
            .template("common", "rate", "A rate.", "per-client")
            .template("common", "latency", "A latency.", "per-client")
            .template("per-topic-group", "byte-rate", "Bytes.", "per-topic")
            .build()
            .unwrap()
    }

    fn collector(ns: Arc<InProcessNamespace>) -> NamespaceCollector {
        NamespaceCollector::new(catalog(), ns)
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("missing family {}", name))
    }

    #[test]
    fn test_collect_empty_namespace() {
        let ns = Arc::new(InProcessNamespace::new());
        assert!(collector(ns).collect().is_empty());
    }

    #[test]
    fn test_collect_common_group() {
        let ns = Arc::new(InProcessNamespace::new());
        let d = Descriptor::new(DOMAIN, "common").with_tag(CLIENT_ID_KEY, "P1");
        ns.set_attribute(&d, "rate", 5.0);
        ns.set_attribute(&d, "latency", 1.5);

        let families = collector(ns).collect();
        assert_eq!(families.len(), 2);

        let rate = family(&families, "example_producer_common_rate");
        assert_eq!(rate.label_names, vec!["client_id"]);
        assert_eq!(rate.samples.len(), 1);
        assert_eq!(rate.samples[0].label_values, vec!["P1"]);
        assert_eq!(rate.samples[0].value, 5.0);
    }

    #[test]
    fn test_collect_cross_group_tuples() {
        let ns = Arc::new(InProcessNamespace::new());
        for topic in ["orders", "payments"] {
            let d = Descriptor::new(DOMAIN, "per-topic-group")
                .with_tag(CLIENT_ID_KEY, "P1")
                .with_tag("topic", topic);
            ns.set_attribute(&d, "byte-rate", 100.0);
        }

        let families = collector(ns).collect();
        let bytes = family(&families, "example_producer_per_topic_group_byte_rate");

        assert_eq!(bytes.label_names, vec!["client_id", "topic"]);
        assert_eq!(bytes.samples.len(), 2);
        let tuples: HashSet<Vec<String>> =
            bytes.samples.iter().map(|s| s.label_values.clone()).collect();
        assert!(tuples.contains(&vec!["P1".to_string(), "orders".to_string()]));
        assert!(tuples.contains(&vec!["P1".to_string(), "payments".to_string()]));
    }

    #[test]
    fn test_collect_isolates_bad_group() {
        let ns = Arc::new(InProcessNamespace::new());

        // Healthy common-group client.
        let good = Descriptor::new(DOMAIN, "common").with_tag(CLIENT_ID_KEY, "P1");
        ns.set_attribute(&good, "rate", 5.0);

        // A client id that breaks the second-stage pattern.
        let bad = Descriptor::new(DOMAIN, "per-topic-group")
            .with_tag(CLIENT_ID_KEY, "evil,id")
            .with_tag("topic", "orders");
        ns.set_attribute(&bad, "byte-rate", 9.0);

        let families = collector(ns).collect();

        // The topic group is empty, the common group is unaffected.
        assert!(
            families
                .iter()
                .all(|f| !f.name.contains("per_topic_group"))
        );
        assert_eq!(family(&families, "example_producer_common_rate").samples.len(), 1);
    }

    #[test]
    fn test_collect_omits_unresolvable_descriptor() {
        let ns = Arc::new(InProcessNamespace::new());
        let p1 = Descriptor::new(DOMAIN, "common").with_tag(CLIENT_ID_KEY, "P1");
        let p2 = Descriptor::new(DOMAIN, "common").with_tag(CLIENT_ID_KEY, "P2");
        // P1 exposes only `rate`; its `latency` read fails and is dropped.
        ns.set_attribute(&p1, "rate", 5.0);
        ns.set_attribute(&p2, "rate", 6.0);
        ns.set_attribute(&p2, "latency", 2.0);

        let families = collector(ns).collect();

        assert_eq!(family(&families, "example_producer_common_rate").samples.len(), 2);
        let latency = family(&families, "example_producer_common_latency");
        assert_eq!(latency.samples.len(), 1);
        assert_eq!(latency.samples[0].label_values, vec!["P2"]);
    }

    #[test]
    fn test_collect_fresh_snapshot_each_scrape() {
        let ns = Arc::new(InProcessNamespace::new());
        let collector = collector(ns.clone());

        let d = Descriptor::new(DOMAIN, "common").with_tag(CLIENT_ID_KEY, "P1");
        ns.set_attribute(&d, "rate", 5.0);
        assert_eq!(collector.collect().len(), 1);

        ns.unregister(&d);
        assert!(collector.collect().is_empty());
    }
}
