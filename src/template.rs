//! Static metric template catalogs.
//!
//! A [`RoleCatalog`] declares, for one client role, which
//! `(group, attribute, tag schema)` combinations exist. It is built once
//! from static data, validated eagerly, and never changes afterwards.
//! Everything discovered at runtime ([`TagTuple`]s and the
//! [`MetricDescriptor`]s expanded from them) is recomputed from scratch on
//! every scrape.

use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;
use crate::mapping;
use crate::namespace::Descriptor;

/// The primary tag key every schema starts with.
pub const CLIENT_ID_KEY: &str = "client-id";

/// Ordered list of tag keys parameterizing one template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagSchema {
    keys: Vec<String>,
}

impl TagSchema {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The key discoverable only via a second, client-scoped query.
    /// `None` for one-key "common" schemas.
    pub fn secondary_key(&self) -> Option<&str> {
        self.keys.get(1).map(String::as_str)
    }
}

/// Concrete tag values for one discovered live instance.
///
/// Keys are kept in the order of the schema they were discovered for, so a
/// tuple's keys can be compared against a schema positionally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagTuple {
    pairs: Vec<(String, String)>,
}

impl TagTuple {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Shorthand for the one-key "common" tuple.
    pub fn client(client_id: impl Into<String>) -> Self {
        Self::new([(CLIENT_ID_KEY, client_id.into())])
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Tag values in key order, verbatim.
    pub fn values(&self) -> Vec<String> {
        self.pairs.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Whether this tuple's keys equal the schema's keys, same order.
    pub fn matches_schema(&self, schema: &TagSchema) -> bool {
        self.pairs.len() == schema.len()
            && self
                .pairs
                .iter()
                .zip(schema.keys())
                .all(|((key, _), schema_key)| key == schema_key)
    }
}

/// One declared metric: a `(group, attribute)` pair plus the tag schema
/// that parameterizes its instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTemplate {
    pub group: String,
    pub attribute: String,
    pub help: String,
    pub schema: TagSchema,
}

/// One concrete time series for one scrape: a template paired with a
/// discovered tag tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor<'a> {
    pub template: &'a MetricTemplate,
    pub tags: TagTuple,
}

impl MetricDescriptor<'_> {
    /// The registry descriptor this series reads its value from.
    pub fn registry_descriptor(&self, domain: &str) -> Descriptor {
        let mut descriptor = Descriptor::new(domain, &self.template.group);
        for (key, value) in self.tags.pairs() {
            descriptor = descriptor.with_tag(key, value);
        }
        descriptor
    }
}

/// Immutable per-role catalog of metric templates.
pub struct RoleCatalog {
    domain: String,
    templates: Vec<MetricTemplate>,
}

impl RoleCatalog {
    pub fn builder(domain: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder {
            domain: domain.into(),
            schemas: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn templates(&self) -> &[MetricTemplate] {
        &self.templates
    }

    /// Distinct `(group, schema)` pairs in declaration order.
    ///
    /// A group may appear more than once when it declares templates under
    /// several schemas (the consumer fetch group does).
    pub fn group_schemas(&self) -> Vec<(&str, &TagSchema)> {
        let mut pairs: Vec<(&str, &TagSchema)> = Vec::new();
        for template in &self.templates {
            let pair = (template.group.as_str(), &template.schema);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Pair every declared template of `group` with every discovered tuple
    /// whose keys satisfy the template's schema.
    ///
    /// Zero tuples produce zero descriptors; absence is not an error. The
    /// tuple set is already deduplicated, so no duplicate
    /// `(template, tags)` pair can be produced within one scrape.
    pub fn expand<'a>(
        &'a self,
        group: &str,
        discovered: &HashSet<TagTuple>,
    ) -> Vec<MetricDescriptor<'a>> {
        let mut descriptors = Vec::new();
        for template in self.templates.iter().filter(|t| t.group == group) {
            for tuple in discovered {
                if tuple.matches_schema(&template.schema) {
                    descriptors.push(MetricDescriptor {
                        template,
                        tags: tuple.clone(),
                    });
                }
            }
        }
        descriptors
    }
}

/// Builder for [`RoleCatalog`]; all validation happens in [`build`].
///
/// [`build`]: CatalogBuilder::build
pub struct CatalogBuilder {
    domain: String,
    schemas: Vec<(String, TagSchema)>,
    entries: Vec<TemplateEntry>,
}

struct TemplateEntry {
    group: String,
    attribute: String,
    help: String,
    schema_name: String,
}

impl CatalogBuilder {
    /// Declare a named tag schema.
    pub fn schema<I, S>(mut self, name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas.push((name.into(), TagSchema::new(keys)));
        self
    }

    /// Declare one metric template under a previously named schema.
    pub fn template(
        mut self,
        group: impl Into<String>,
        attribute: impl Into<String>,
        help: impl Into<String>,
        schema_name: impl Into<String>,
    ) -> Self {
        self.entries.push(TemplateEntry {
            group: group.into(),
            attribute: attribute.into(),
            help: help.into(),
            schema_name: schema_name.into(),
        });
        self
    }

    pub fn build(self) -> Result<RoleCatalog, CatalogError> {
        if self.domain.is_empty()
            || !self
                .domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(CatalogError::InvalidDomain(self.domain));
        }

        let mut schemas: HashMap<String, TagSchema> = HashMap::new();
        for (name, schema) in self.schemas {
            if schema.is_empty() || schema.len() > 2 {
                return Err(CatalogError::InvalidSchema {
                    name,
                    reason: "a schema has one or two keys".to_string(),
                });
            }
            if schema.keys()[0] != CLIENT_ID_KEY {
                return Err(CatalogError::InvalidSchema {
                    name,
                    reason: format!("the first key must be `{}`", CLIENT_ID_KEY),
                });
            }
            schemas.insert(name, schema);
        }

        let mut templates = Vec::with_capacity(self.entries.len());
        let mut declared: HashSet<(String, String, String)> = HashSet::new();
        for entry in self.entries {
            // A repeated declaration would pair twice with the same tuple
            // and emit two samples for one series.
            if !declared.insert((
                entry.group.clone(),
                entry.attribute.clone(),
                entry.schema_name.clone(),
            )) {
                return Err(CatalogError::DuplicateTemplate {
                    group: entry.group,
                    attribute: entry.attribute,
                    schema: entry.schema_name,
                });
            }
            let Some(schema) = schemas.get(&entry.schema_name) else {
                return Err(CatalogError::UnknownSchema {
                    group: entry.group,
                    attribute: entry.attribute,
                    schema: entry.schema_name,
                });
            };
            templates.push(MetricTemplate {
                group: entry.group,
                attribute: entry.attribute,
                help: entry.help,
                schema: schema.clone(),
            });
        }

        // Two distinct (group, attribute) pairs must never normalize to
        // the same external name; fail fast instead of overwriting.
        let mut seen: HashMap<String, String> = HashMap::new();
        for template in &templates {
            let name = mapping::metric_name(&self.domain, &template.group, &template.attribute);
            let source = format!("{}/{}", template.group, template.attribute);
            if let Some(first) = seen.get(&name) {
                if first != &source {
                    return Err(CatalogError::NameCollision {
                        name,
                        first: first.clone(),
                        second: source,
                    });
                }
            } else {
                seen.insert(name, source);
            }
        }

        Ok(RoleCatalog {
            domain: self.domain,
            templates,
        })
    }
}
