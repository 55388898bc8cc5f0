//! Adapter layer over the host's management namespace.
//!
//! The namespace is a registry of instrumented entities, each identified by
//! a [`Descriptor`] (domain + metric group + ordered tag key-value pairs)
//! and carrying a set of readable attributes. The core only requires two
//! operations, captured by the [`ManagementNamespace`] trait: a wildcard
//! pattern query and a single attribute read.
//!
//! [`InProcessNamespace`] is the built-in implementation: a thread-safe
//! in-process registry that host code instruments directly. It also serves
//! as the test double for everything downstream.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;

use crate::error::{AttributeUnavailable, QueryError};

/// Identifier of one instrumented entity within the registry.
///
/// Tags are kept in a canonical (sorted) order so that two descriptors
/// naming the same entity compare and hash equal regardless of the order
/// their tags were attached in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    domain: String,
    group: String,
    tags: BTreeMap<String, String>,
}

impl Descriptor {
    pub fn new(domain: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            group: group.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Attach a tag, replacing any previous value for the same key.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Look up one tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.group)?;
        for (k, v) in &self.tags {
            write!(f, ",{}={}", k, v)?;
        }
        Ok(())
    }
}

/// One element of a parsed tag pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TagMatcher {
    /// `key=value` - the tag must exist with exactly this value.
    Literal(String, String),
    /// `key=*` - the tag must exist, any value.
    Wildcard(String),
}

impl TagMatcher {
    fn key(&self) -> &str {
        match self {
            TagMatcher::Literal(k, _) | TagMatcher::Wildcard(k) => k,
        }
    }
}

/// Parsed form of a discovery pattern.
///
/// Syntax: comma-separated `key=value` pairs. A value of `*` wildcards that
/// single tag. A trailing bare `*` element permits additional, unspecified
/// tags; without it the descriptor's key set must equal the pattern's key
/// set exactly. Omitting a key is not equivalent to wildcarding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    matchers: Vec<TagMatcher>,
    open_ended: bool,
}

impl TagPattern {
    /// Parse a pattern string, rejecting anything syntactically ambiguous.
    pub fn parse(pattern: &str) -> Result<Self, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::malformed(pattern, "empty pattern"));
        }

        let elements: Vec<&str> = pattern.split(',').collect();
        let mut matchers = Vec::with_capacity(elements.len());
        let mut open_ended = false;

        for (i, element) in elements.iter().enumerate() {
            if *element == "*" {
                if i + 1 != elements.len() {
                    return Err(QueryError::malformed(
                        pattern,
                        "`*` is only valid as the final element",
                    ));
                }
                open_ended = true;
                continue;
            }

            let Some((key, value)) = element.split_once('=') else {
                return Err(QueryError::malformed(
                    pattern,
                    format!("element `{}` is not a key=value pair", element),
                ));
            };
            if key.is_empty() {
                return Err(QueryError::malformed(pattern, "empty tag key"));
            }
            if key.contains('*') {
                return Err(QueryError::malformed(
                    pattern,
                    format!("tag key `{}` may not contain `*`", key),
                ));
            }
            if value.is_empty() {
                return Err(QueryError::malformed(
                    pattern,
                    format!("empty value for tag `{}`", key),
                ));
            }
            if matchers.iter().any(|m: &TagMatcher| m.key() == key) {
                return Err(QueryError::malformed(
                    pattern,
                    format!("duplicate tag key `{}`", key),
                ));
            }

            if value == "*" {
                matchers.push(TagMatcher::Wildcard(key.to_string()));
            } else if value.contains('*') {
                return Err(QueryError::malformed(
                    pattern,
                    format!("partial wildcard in value `{}`", value),
                ));
            } else {
                matchers.push(TagMatcher::Literal(key.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            matchers,
            open_ended,
        })
    }

    /// Check whether a descriptor's tag set satisfies this pattern.
    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        for matcher in &self.matchers {
            match matcher {
                TagMatcher::Literal(key, value) => {
                    if descriptor.tag(key) != Some(value.as_str()) {
                        return false;
                    }
                }
                TagMatcher::Wildcard(key) => {
                    if descriptor.tag(key).is_none() {
                        return false;
                    }
                }
            }
        }

        // Pattern keys are unique, so key-count equality means the sets
        // are identical.
        self.open_ended || descriptor.tag_count() == self.matchers.len()
    }
}

/// A readable attribute value.
///
/// Registries expose non-numeric attributes too (version strings and the
/// like); those are registered as `Text` and reported as unavailable when
/// read through [`ManagementNamespace::get_attribute`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Number(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<u64> for AttributeValue {
    fn from(v: u64) -> Self {
        AttributeValue::Number(v as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// The narrow capability the core depends on.
///
/// Both operations are synchronous and side-effect free; implementations
/// must be safe to call from concurrent scrapes.
pub trait ManagementNamespace: Send + Sync {
    /// Return every registered descriptor under `domain`/`group` whose
    /// tags satisfy `tag_pattern`.
    fn query(
        &self,
        domain: &str,
        group: &str,
        tag_pattern: &str,
    ) -> Result<HashSet<Descriptor>, QueryError>;

    /// Read one numeric attribute of one entity.
    fn get_attribute(
        &self,
        descriptor: &Descriptor,
        attribute: &str,
    ) -> Result<f64, AttributeUnavailable>;
}

/// Thread-safe in-process attribute registry.
///
/// Host code registers its instrumented entities here and updates their
/// attribute values as measurements change; the collector discovers and
/// reads them on every scrape. Entities removed with [`unregister`] simply
/// stop appearing in the next scrape.
///
/// [`unregister`]: InProcessNamespace::unregister
#[derive(Default)]
pub struct InProcessNamespace {
    entries: RwLock<HashMap<Descriptor, HashMap<String, AttributeValue>>>,
}

impl InProcessNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one attribute on an entity, registering the entity if needed.
    pub fn set_attribute(
        &self,
        descriptor: &Descriptor,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) {
        let mut entries = self.entries.write();
        entries
            .entry(descriptor.clone())
            .or_default()
            .insert(attribute.into(), value.into());
    }

    /// Remove an entity and all of its attributes.
    pub fn unregister(&self, descriptor: &Descriptor) -> bool {
        self.entries.write().remove(descriptor).is_some()
    }

    /// Remove every registered entity.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl ManagementNamespace for InProcessNamespace {
    fn query(
        &self,
        domain: &str,
        group: &str,
        tag_pattern: &str,
    ) -> Result<HashSet<Descriptor>, QueryError> {
        let pattern = TagPattern::parse(tag_pattern)?;
        let entries = self.entries.read();

        Ok(entries
            .keys()
            .filter(|d| d.domain() == domain && d.group() == group && pattern.matches(d))
            .cloned()
            .collect())
    }

    fn get_attribute(
        &self,
        descriptor: &Descriptor,
        attribute: &str,
    ) -> Result<f64, AttributeUnavailable> {
        let entries = self.entries.read();

        let unavailable = || AttributeUnavailable::new(descriptor.to_string(), attribute);
        let attributes = entries.get(descriptor).ok_or_else(unavailable)?;
        match attributes.get(attribute) {
            Some(AttributeValue::Number(v)) => Ok(*v),
            _ => Err(unavailable()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producer_descriptor(client_id: &str) -> Descriptor {
        Descriptor::new("kafka.producer", "producer-metrics").with_tag("client-id", client_id)
    }

    #[test]
    fn test_descriptor_display() {
        let d = Descriptor::new("kafka.producer", "producer-topic-metrics")
            .with_tag("topic", "orders")
            .with_tag("client-id", "P1");

        // Tags render in canonical order regardless of attachment order.
        assert_eq!(
            d.to_string(),
            "kafka.producer:producer-topic-metrics,client-id=P1,topic=orders"
        );
    }

    #[test]
    fn test_descriptor_tags_iterate_in_canonical_order() {
        let d = Descriptor::new("d", "g")
            .with_tag("topic", "orders")
            .with_tag("client-id", "P1");

        let tags: Vec<(&str, &str)> = d.tags().collect();
        assert_eq!(tags, vec![("client-id", "P1"), ("topic", "orders")]);
    }

    #[test]
    fn test_descriptor_equality_ignores_tag_order() {
        let a = Descriptor::new("d", "g").with_tag("x", "1").with_tag("y", "2");
        let b = Descriptor::new("d", "g").with_tag("y", "2").with_tag("x", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_pattern_single_wildcard() {
        let pattern = TagPattern::parse("client-id=*").unwrap();

        assert!(pattern.matches(&producer_descriptor("P1")));
        // Extra tags are not permitted without a trailing `*`.
        assert!(!pattern.matches(&producer_descriptor("P1").with_tag("topic", "orders")));
    }

    #[test]
    fn test_pattern_open_ended() {
        let pattern = TagPattern::parse("client-id=P1,*").unwrap();

        assert!(pattern.matches(&producer_descriptor("P1")));
        assert!(pattern.matches(&producer_descriptor("P1").with_tag("topic", "orders")));
        assert!(!pattern.matches(&producer_descriptor("P2").with_tag("topic", "orders")));
    }

    #[test]
    fn test_pattern_omitted_key_is_not_wildcard() {
        let pattern = TagPattern::parse("topic=orders").unwrap();

        // The descriptor carries client-id too, and the pattern did not
        // mention it or end with `*`.
        assert!(!pattern.matches(&producer_descriptor("P1").with_tag("topic", "orders")));
    }

    #[test]
    fn test_pattern_malformed() {
        assert!(TagPattern::parse("").is_err());
        assert!(TagPattern::parse("client-id").is_err());
        assert!(TagPattern::parse("=value").is_err());
        assert!(TagPattern::parse("client-id=").is_err());
        assert!(TagPattern::parse("client-id=a,client-id=b").is_err());
        assert!(TagPattern::parse("*,client-id=a").is_err());
        assert!(TagPattern::parse("client-id=pre*fix").is_err());
        // A client id containing a comma produces a dangling element.
        assert!(TagPattern::parse("client-id=a,b,*").is_err());
    }

    #[test]
    fn test_query_filters_by_domain_group_and_pattern() {
        let ns = InProcessNamespace::new();
        ns.set_attribute(&producer_descriptor("P1"), "record-send-rate", 5.0);
        ns.set_attribute(&producer_descriptor("P2"), "record-send-rate", 7.0);
        ns.set_attribute(
            &Descriptor::new("kafka.consumer", "consumer-metrics").with_tag("client-id", "C1"),
            "fetch-rate",
            1.0,
        );

        let found = ns
            .query("kafka.producer", "producer-metrics", "client-id=*,*")
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.domain() == "kafka.producer"));
    }

    #[test]
    fn test_query_malformed_pattern() {
        let ns = InProcessNamespace::new();
        let err = ns.query("kafka.producer", "producer-metrics", "client-id");
        assert!(matches!(err, Err(QueryError::MalformedPattern { .. })));
    }

    #[test]
    fn test_get_attribute_missing_entity() {
        let ns = InProcessNamespace::new();
        let err = ns.get_attribute(&producer_descriptor("ghost"), "record-send-rate");
        assert!(err.is_err());
    }

    #[test]
    fn test_get_attribute_non_numeric() {
        let ns = InProcessNamespace::new();
        let d = producer_descriptor("P1");
        ns.set_attribute(&d, "version", "3.7.0");

        assert!(ns.get_attribute(&d, "version").is_err());
    }

    #[test]
    fn test_unregister_removes_from_queries() {
        let ns = InProcessNamespace::new();
        let d = producer_descriptor("P1");
        ns.set_attribute(&d, "record-send-rate", 5.0);
        assert_eq!(ns.entity_count(), 1);

        assert!(ns.unregister(&d));
        assert!(!ns.unregister(&d));

        let found = ns
            .query("kafka.producer", "producer-metrics", "client-id=*")
            .unwrap();
        assert!(found.is_empty());
    }
}
