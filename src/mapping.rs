//! Stable mapping from registry naming to Prometheus naming.
//!
//! Metric and label names are sanitized to the Prometheus charsets; label
//! values are never touched and pass through verbatim.

use crate::template::TagSchema;

/// Sanitize a metric name to be Prometheus-compatible.
///
/// Prometheus metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
/// This function:
/// - Replaces invalid characters with underscores
/// - Ensures the name starts with a letter or underscore
/// - Collapses multiple underscores into one
pub fn sanitize_metric_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    let mut last_was_underscore = false;
    let mut chars = name.chars().peekable();

    // Handle first character specially - must be letter or underscore
    // If it's a digit, prefix with underscore and keep the digit
    if let Some(&first) = chars.peek()
        && first.is_ascii_digit()
    {
        result.push('_');
        last_was_underscore = true;
    }

    for c in chars {
        let is_valid_char = c.is_ascii_alphanumeric() || c == '_' || c == ':';

        if is_valid_char {
            if c == '_' {
                if !last_was_underscore {
                    result.push(c);
                    last_was_underscore = true;
                }
            } else {
                result.push(c);
                last_was_underscore = false;
            }
        } else if !last_was_underscore {
            result.push('_');
            last_was_underscore = true;
        }
    }

    while result.ends_with('_') {
        result.pop();
    }

    if result.is_empty() {
        result.push_str("unnamed");
    }

    result
}

/// Sanitize a label name to be Prometheus-compatible.
///
/// Prometheus label names must match `[a-zA-Z_][a-zA-Z0-9_]*`.
/// Labels starting with `__` are reserved for internal use.
pub fn sanitize_label_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_underscore = false;

    for (i, c) in name.chars().enumerate() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };

        if valid {
            result.push(c);
            last_was_underscore = c == '_';
        } else if !last_was_underscore {
            result.push('_');
            last_was_underscore = true;
        }
    }

    while result.ends_with('_') {
        result.pop();
    }

    if result.is_empty() {
        return "label".to_string();
    }

    if result.starts_with("__") {
        result.insert(0, 'z');
    }

    result
}

/// Build the external metric name for one `(group, attribute)` pair.
///
/// Format: `{domain}_{group}_{attribute}`, sanitized. Pure function of its
/// inputs, so the same pair yields the same name on every scrape and
/// across restarts.
pub fn metric_name(domain: &str, group: &str, attribute: &str) -> String {
    sanitize_metric_name(&format!("{}_{}_{}", domain, group, attribute))
}

/// Label names for a tag schema, in declared order.
pub fn label_names(schema: &TagSchema) -> Vec<String> {
    schema.keys().iter().map(|k| sanitize_label_name(k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_metric_name_simple() {
        assert_eq!(sanitize_metric_name("record_send_rate"), "record_send_rate");
    }

    #[test]
    fn test_sanitize_metric_name_special_chars() {
        assert_eq!(sanitize_metric_name("kafka.producer"), "kafka_producer");
        assert_eq!(sanitize_metric_name("record-send-rate"), "record_send_rate");
        assert_eq!(sanitize_metric_name("io-wait-time-ns-avg"), "io_wait_time_ns_avg");
    }

    #[test]
    fn test_sanitize_metric_name_collapse_underscores() {
        assert_eq!(sanitize_metric_name("a__b--c"), "a_b_c");
    }

    #[test]
    fn test_sanitize_metric_name_leading_digit() {
        assert_eq!(sanitize_metric_name("5xx-rate"), "_5xx_rate");
    }

    #[test]
    fn test_sanitize_metric_name_empty() {
        assert_eq!(sanitize_metric_name(""), "unnamed");
        assert_eq!(sanitize_metric_name("---"), "unnamed");
    }

    #[test]
    fn test_sanitize_label_name() {
        assert_eq!(sanitize_label_name("client-id"), "client_id");
        assert_eq!(sanitize_label_name("node-id"), "node_id");
        assert_eq!(sanitize_label_name("topic"), "topic");
    }

    #[test]
    fn test_sanitize_label_name_reserved() {
        assert_eq!(sanitize_label_name("__meta"), "z__meta");
    }

    #[test]
    fn test_metric_name() {
        assert_eq!(
            metric_name("kafka.producer", "producer-metrics", "record-send-rate"),
            "kafka_producer_producer_metrics_record_send_rate"
        );
    }

    #[test]
    fn test_metric_name_is_stable() {
        let first = metric_name("kafka.consumer", "consumer-fetch-manager-metrics", "fetch-rate");
        let second = metric_name("kafka.consumer", "consumer-fetch-manager-metrics", "fetch-rate");
        assert_eq!(first, second);
    }

    #[test]
    fn test_label_names_preserve_schema_order() {
        let schema = TagSchema::new(["client-id", "topic"]);
        assert_eq!(label_names(&schema), vec!["client_id", "topic"]);
    }
}
