use thiserror::Error;

/// Discovery query failures.
///
/// A malformed pattern is a defect in the caller, not in the registry. The
/// collector isolates it to the group whose discovery produced it.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("malformed tag pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },
}

impl QueryError {
    pub fn malformed(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::MalformedPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// An attribute read that could not produce a numeric value.
///
/// This is expected behavior under churn: the entity vanished between
/// discovery and read, the attribute does not exist, or its value is not
/// numeric. The affected sample is dropped, never fabricated.
#[derive(Debug, Clone, Error)]
#[error("attribute `{attribute}` unavailable on `{descriptor}`")]
pub struct AttributeUnavailable {
    /// Display form of the registry descriptor that was queried.
    pub descriptor: String,
    /// The attribute that was requested.
    pub attribute: String,
}

impl AttributeUnavailable {
    pub fn new(descriptor: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            attribute: attribute.into(),
        }
    }
}

/// Fatal catalog construction errors.
///
/// These are the only errors that abort startup; everything after
/// construction degrades per group or per descriptor instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid domain `{0}`")]
    InvalidDomain(String),

    #[error("invalid tag schema `{name}`: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error(
        "template `{group}/{attribute}` references undefined tag schema `{schema}`"
    )]
    UnknownSchema {
        group: String,
        attribute: String,
        schema: String,
    },

    #[error("template `{group}/{attribute}` is declared twice under schema `{schema}`")]
    DuplicateTemplate {
        group: String,
        attribute: String,
        schema: String,
    },

    #[error(
        "metric name collision: `{name}` is produced by both `{first}` and `{second}`"
    )]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },
}
