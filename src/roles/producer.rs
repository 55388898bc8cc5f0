//! Producer role catalog.
//!
//! A producer client registers three metric groups in the
//! `kafka.producer` domain: common sender metrics per client, per-broker
//! connection metrics, and per-topic send metrics.

use crate::error::CatalogError;
use crate::template::{CLIENT_ID_KEY, RoleCatalog};

use super::{PER_BROKER_SCHEMA, PER_CLIENT_SCHEMA, PER_TOPIC_SCHEMA};

pub const PRODUCER_DOMAIN: &str = "kafka.producer";

pub const PRODUCER_METRIC_GROUP: &str = "producer-metrics";
pub const PRODUCER_NODE_METRIC_GROUP: &str = "producer-node-metrics";
pub const PRODUCER_TOPIC_METRIC_GROUP: &str = "producer-topic-metrics";

/// Build the producer catalog.
pub fn producer() -> Result<RoleCatalog, CatalogError> {
    let g = PRODUCER_METRIC_GROUP;
    let node = PRODUCER_NODE_METRIC_GROUP;
    let topic = PRODUCER_TOPIC_METRIC_GROUP;

    RoleCatalog::builder(PRODUCER_DOMAIN)
        .schema(PER_CLIENT_SCHEMA, [CLIENT_ID_KEY])
        .schema(PER_BROKER_SCHEMA, [CLIENT_ID_KEY, "node-id"])
        .schema(PER_TOPIC_SCHEMA, [CLIENT_ID_KEY, "topic"])
        // Common sender metrics.
        .template(g, "batch-size-avg", "The average number of bytes sent per partition per request.", PER_CLIENT_SCHEMA)
        .template(g, "record-send-rate", "The average number of records sent per second.", PER_CLIENT_SCHEMA)
        .template(g, "record-error-rate", "The average per-second number of record sends that resulted in errors.", PER_CLIENT_SCHEMA)
        .template(g, "record-retry-rate", "The average per-second number of retried record sends.", PER_CLIENT_SCHEMA)
        .template(g, "record-queue-time-avg", "The average time in ms record batches spent in the send buffer.", PER_CLIENT_SCHEMA)
        .template(g, "request-latency-avg", "The average request latency in ms.", PER_CLIENT_SCHEMA)
        .template(g, "requests-in-flight", "The current number of in-flight requests awaiting a response.", PER_CLIENT_SCHEMA)
        .template(g, "outgoing-byte-rate", "The average number of outgoing bytes sent per second to all servers.", PER_CLIENT_SCHEMA)
        .template(g, "incoming-byte-rate", "Bytes per second read off all sockets.", PER_CLIENT_SCHEMA)
        .template(g, "request-rate", "The average number of requests sent per second.", PER_CLIENT_SCHEMA)
        .template(g, "response-rate", "Responses received per second.", PER_CLIENT_SCHEMA)
        .template(g, "connection-count", "The current number of active connections.", PER_CLIENT_SCHEMA)
        .template(g, "io-wait-time-ns-avg", "The average length of time the I/O thread spent waiting for a socket ready for reads or writes in nanoseconds.", PER_CLIENT_SCHEMA)
        .template(g, "metadata-age", "The age in seconds of the current producer metadata being used.", PER_CLIENT_SCHEMA)
        .template(g, "compression-rate-avg", "The average compression rate of record batches.", PER_CLIENT_SCHEMA)
        .template(g, "buffer-total-bytes", "The maximum amount of buffer memory the client can use.", PER_CLIENT_SCHEMA)
        .template(g, "buffer-available-bytes", "The total amount of buffer memory that is not being used.", PER_CLIENT_SCHEMA)
        .template(g, "waiting-threads", "The number of user threads blocked waiting for buffer memory to enqueue their records.", PER_CLIENT_SCHEMA)
        // Per-broker metrics.
        .template(node, "incoming-byte-rate", "The average number of responses received per second from the node.", PER_BROKER_SCHEMA)
        .template(node, "outgoing-byte-rate", "The average number of outgoing bytes sent per second to the node.", PER_BROKER_SCHEMA)
        .template(node, "request-rate", "The average number of requests sent per second to the node.", PER_BROKER_SCHEMA)
        .template(node, "response-rate", "Responses received per second from the node.", PER_BROKER_SCHEMA)
        .template(node, "request-latency-avg", "The average request latency in ms for the node.", PER_BROKER_SCHEMA)
        .template(node, "request-size-avg", "The average size of all requests in the window for the node.", PER_BROKER_SCHEMA)
        // Per-topic metrics.
        .template(topic, "byte-rate", "The average number of bytes sent per second for the topic.", PER_TOPIC_SCHEMA)
        .template(topic, "record-send-rate", "The average number of records sent per second for the topic.", PER_TOPIC_SCHEMA)
        .template(topic, "record-retry-rate", "The average per-second number of retried record sends for the topic.", PER_TOPIC_SCHEMA)
        .template(topic, "record-error-rate", "The average per-second number of record sends that resulted in errors for the topic.", PER_TOPIC_SCHEMA)
        .template(topic, "compression-rate", "The average compression rate of record batches for the topic.", PER_TOPIC_SCHEMA)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_catalog_builds() {
        let catalog = producer().unwrap();
        assert_eq!(catalog.domain(), PRODUCER_DOMAIN);
        assert_eq!(catalog.templates().len(), 29);
    }

    #[test]
    fn test_producer_group_schemas() {
        let catalog = producer().unwrap();
        let pairs = catalog.group_schemas();
        assert_eq!(pairs.len(), 3);

        let groups: Vec<&str> = pairs.iter().map(|(g, _)| *g).collect();
        assert_eq!(
            groups,
            vec![
                PRODUCER_METRIC_GROUP,
                PRODUCER_NODE_METRIC_GROUP,
                PRODUCER_TOPIC_METRIC_GROUP
            ]
        );
    }
}
