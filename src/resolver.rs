//! Resolution of one metric descriptor to one numeric sample.

use tracing::debug;

use crate::namespace::ManagementNamespace;
use crate::template::MetricDescriptor;

/// Read the current value for one descriptor.
///
/// `None` means the entity or attribute vanished between discovery and
/// read, or the value is non-numeric. The sample is dropped from the
/// snapshot rather than fabricated; under churn this is expected, so it is
/// logged at debug only.
pub fn resolve(
    namespace: &dyn ManagementNamespace,
    domain: &str,
    descriptor: &MetricDescriptor<'_>,
) -> Option<f64> {
    let registry_descriptor = descriptor.registry_descriptor(domain);

    match namespace.get_attribute(&registry_descriptor, &descriptor.template.attribute) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "dropping sample for vanished entity");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Descriptor, InProcessNamespace};
    use crate::template::{CLIENT_ID_KEY, MetricTemplate, TagSchema, TagTuple};

    fn template() -> MetricTemplate {
        MetricTemplate {
            group: "producer-metrics".to_string(),
            attribute: "record-send-rate".to_string(),
            help: "Records per second.".to_string(),
            schema: TagSchema::new([CLIENT_ID_KEY]),
        }
    }

    #[test]
    fn test_resolve_present_entity() {
        let ns = InProcessNamespace::new();
        let registered =
            Descriptor::new("kafka.producer", "producer-metrics").with_tag(CLIENT_ID_KEY, "P1");
        ns.set_attribute(&registered, "record-send-rate", 42.5);

        let template = template();
        let descriptor = MetricDescriptor {
            template: &template,
            tags: TagTuple::client("P1"),
        };

        assert_eq!(resolve(&ns, "kafka.producer", &descriptor), Some(42.5));
    }

    #[test]
    fn test_resolve_vanished_entity_is_none() {
        let ns = InProcessNamespace::new();

        let template = template();
        let descriptor = MetricDescriptor {
            template: &template,
            tags: TagTuple::client("gone"),
        };

        assert_eq!(resolve(&ns, "kafka.producer", &descriptor), None);
    }
}
