//! Built-in role catalogs.
//!
//! Each role is pure data: a domain, its metric groups, and the templates
//! declared under the shared schema shapes ("per-client", "per-broker",
//! "per-topic"). The discovery and expansion logic is role-agnostic.

mod consumer;
mod producer;

pub use consumer::{
    CONSUMER_COORDINATOR_METRIC_GROUP, CONSUMER_DOMAIN, CONSUMER_FETCH_METRIC_GROUP,
    CONSUMER_METRIC_GROUP, CONSUMER_NODE_METRIC_GROUP, consumer,
};
pub use producer::{
    PRODUCER_DOMAIN, PRODUCER_METRIC_GROUP, PRODUCER_NODE_METRIC_GROUP,
    PRODUCER_TOPIC_METRIC_GROUP, producer,
};

/// Schema name for one-key `[client-id]` templates.
pub const PER_CLIENT_SCHEMA: &str = "per-client";
/// Schema name for two-key `[client-id, node-id]` templates.
pub const PER_BROKER_SCHEMA: &str = "per-broker";
/// Schema name for two-key `[client-id, topic]` templates.
pub const PER_TOPIC_SCHEMA: &str = "per-topic";
