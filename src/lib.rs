//! Prometheus exporter for management-namespace client metrics.
//!
//! This crate bridges a host process's management namespace - a dynamic,
//! hierarchical registry of instrumented entities (clients, topics, broker
//! nodes) - into the Prometheus pull model. On each scrape it discovers
//! which entities currently exist, expands a fixed catalog of metric
//! templates against that live population, reads attribute values, and
//! renders label-tagged samples.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ ManagementName-  │────>│ NamespaceCollect-│────>│   HTTP Server   │
//! │ space (registry) │     │ or (per scrape)  │     │   (/metrics)    │
//! └──────────────────┘     └──────────────────┘     └─────────────────┘
//! ```
//!
//! Per scrape: discover live client ids per group, discover each client's
//! secondary associations (topics, nodes) where a template needs them,
//! expand templates against the observed tuples only, resolve each
//! descriptor to a value, and flatten into metric families. Entities that
//! vanish mid-scrape drop out silently; nothing is cached across scrapes.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use mns_exporter::{Descriptor, InProcessNamespace, NamespaceCollector, exposition, roles};
//!
//! let namespace = Arc::new(InProcessNamespace::new());
//! let producer = Descriptor::new(roles::PRODUCER_DOMAIN, roles::PRODUCER_METRIC_GROUP)
//!     .with_tag("client-id", "orders-service");
//! namespace.set_attribute(&producer, "record-send-rate", 118.0);
//!
//! let collector = NamespaceCollector::new(roles::producer().unwrap(), namespace);
//! let families = collector.collect();
//! println!("{}", exposition::render(&families));
//! ```

pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exposition;
pub mod http;
pub mod mapping;
pub mod namespace;
pub mod resolver;
pub mod roles;
pub mod template;

pub use collector::{MetricFamily, MetricSample, NamespaceCollector};
pub use config::{ConfigError, ExporterConfig, LogFormat, LoggingConfig};
pub use discovery::EntityDiscovery;
pub use error::{AttributeUnavailable, CatalogError, QueryError};
pub use http::HttpServer;
pub use namespace::{AttributeValue, Descriptor, InProcessNamespace, ManagementNamespace, TagPattern};
pub use template::{
    CLIENT_ID_KEY, CatalogBuilder, MetricDescriptor, MetricTemplate, RoleCatalog, TagSchema,
    TagTuple,
};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Validation(format!("Failed to initialize tracing: {}", e))
                })?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| {
                    ConfigError::Validation(format!("Failed to initialize tracing: {}", e))
                })?;
        }
    }

    Ok(())
}
