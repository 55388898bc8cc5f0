//! Consumer role catalog.
//!
//! A consumer client registers four metric groups in the
//! `kafka.consumer` domain. The fetch-manager group is the one case of a
//! group declaring templates under two schema shapes: aggregate per-client
//! fetch metrics and their per-topic breakdown share attribute names.

use crate::error::CatalogError;
use crate::template::{CLIENT_ID_KEY, RoleCatalog};

use super::{PER_BROKER_SCHEMA, PER_CLIENT_SCHEMA, PER_TOPIC_SCHEMA};

pub const CONSUMER_DOMAIN: &str = "kafka.consumer";

pub const CONSUMER_METRIC_GROUP: &str = "consumer-metrics";
pub const CONSUMER_COORDINATOR_METRIC_GROUP: &str = "consumer-coordinator-metrics";
pub const CONSUMER_FETCH_METRIC_GROUP: &str = "consumer-fetch-manager-metrics";
pub const CONSUMER_NODE_METRIC_GROUP: &str = "consumer-node-metrics";

/// Build the consumer catalog.
pub fn consumer() -> Result<RoleCatalog, CatalogError> {
    let g = CONSUMER_METRIC_GROUP;
    let coord = CONSUMER_COORDINATOR_METRIC_GROUP;
    let fetch = CONSUMER_FETCH_METRIC_GROUP;
    let node = CONSUMER_NODE_METRIC_GROUP;

    RoleCatalog::builder(CONSUMER_DOMAIN)
        .schema(PER_CLIENT_SCHEMA, [CLIENT_ID_KEY])
        .schema(PER_BROKER_SCHEMA, [CLIENT_ID_KEY, "node-id"])
        .schema(PER_TOPIC_SCHEMA, [CLIENT_ID_KEY, "topic"])
        // Common connection metrics.
        .template(g, "connection-count", "The current number of active connections.", PER_CLIENT_SCHEMA)
        .template(g, "incoming-byte-rate", "Bytes per second read off all sockets.", PER_CLIENT_SCHEMA)
        .template(g, "outgoing-byte-rate", "The average number of outgoing bytes sent per second to all servers.", PER_CLIENT_SCHEMA)
        .template(g, "request-rate", "The average number of requests sent per second.", PER_CLIENT_SCHEMA)
        .template(g, "response-rate", "Responses received per second.", PER_CLIENT_SCHEMA)
        .template(g, "io-ratio", "The fraction of time the I/O thread spent doing I/O.", PER_CLIENT_SCHEMA)
        .template(g, "io-wait-ratio", "The fraction of time the I/O thread spent waiting.", PER_CLIENT_SCHEMA)
        .template(g, "select-rate", "The number of times the I/O layer checked for new I/O to perform per second.", PER_CLIENT_SCHEMA)
        // Group coordination metrics.
        .template(coord, "assigned-partitions", "The number of partitions currently assigned to this consumer.", PER_CLIENT_SCHEMA)
        .template(coord, "commit-latency-avg", "The average time taken for a commit request.", PER_CLIENT_SCHEMA)
        .template(coord, "commit-rate", "The number of commit calls per second.", PER_CLIENT_SCHEMA)
        .template(coord, "join-rate", "The number of group joins per second.", PER_CLIENT_SCHEMA)
        .template(coord, "join-time-avg", "The average time taken for a group rejoin.", PER_CLIENT_SCHEMA)
        .template(coord, "sync-rate", "The number of group syncs per second.", PER_CLIENT_SCHEMA)
        .template(coord, "heartbeat-rate", "The average number of heartbeats per second.", PER_CLIENT_SCHEMA)
        .template(coord, "last-heartbeat-seconds-ago", "The number of seconds since the last controller heartbeat.", PER_CLIENT_SCHEMA)
        // Fetch metrics, aggregate across topics.
        .template(fetch, "bytes-consumed-rate", "The average number of bytes consumed per second.", PER_CLIENT_SCHEMA)
        .template(fetch, "records-consumed-rate", "The average number of records consumed per second.", PER_CLIENT_SCHEMA)
        .template(fetch, "fetch-latency-avg", "The average time taken for a fetch request.", PER_CLIENT_SCHEMA)
        .template(fetch, "fetch-rate", "The number of fetch requests per second.", PER_CLIENT_SCHEMA)
        .template(fetch, "fetch-size-avg", "The average number of bytes fetched per request.", PER_CLIENT_SCHEMA)
        .template(fetch, "records-lag-max", "The maximum lag in terms of number of records for any partition.", PER_CLIENT_SCHEMA)
        // Fetch metrics, per topic.
        .template(fetch, "bytes-consumed-rate", "The average number of bytes consumed per second for the topic.", PER_TOPIC_SCHEMA)
        .template(fetch, "records-consumed-rate", "The average number of records consumed per second for the topic.", PER_TOPIC_SCHEMA)
        .template(fetch, "fetch-size-avg", "The average number of bytes fetched per request for the topic.", PER_TOPIC_SCHEMA)
        .template(fetch, "records-per-request-avg", "The average number of records in each request for the topic.", PER_TOPIC_SCHEMA)
        // Per-broker metrics.
        .template(node, "incoming-byte-rate", "The average number of responses received per second from the node.", PER_BROKER_SCHEMA)
        .template(node, "outgoing-byte-rate", "The average number of outgoing bytes sent per second to the node.", PER_BROKER_SCHEMA)
        .template(node, "request-rate", "The average number of requests sent per second to the node.", PER_BROKER_SCHEMA)
        .template(node, "response-rate", "Responses received per second from the node.", PER_BROKER_SCHEMA)
        .template(node, "request-latency-avg", "The average request latency in ms for the node.", PER_BROKER_SCHEMA)
        .template(node, "request-size-avg", "The average size of all requests in the window for the node.", PER_BROKER_SCHEMA)
        .build()
}
