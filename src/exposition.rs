//! Prometheus text exposition format (version 0.0.4).
//!
//! Escaping applies to label values only at the wire level; the values
//! themselves are carried verbatim from discovery.

use std::io::Write;

use tracing::warn;

use crate::collector::{MetricFamily, MetricSample};

/// Content type for the rendered output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render a flattened snapshot in exposition format.
///
/// All exported attributes are point-in-time readings, so every family is
/// a gauge. Samples whose label-value arity does not match their family
/// are malformed input and are skipped with a warning.
pub fn render(families: &[MetricFamily]) -> String {
    let mut output = Vec::with_capacity(families.len() * 100);

    // Sort by name for consistent output; families sharing a name (same
    // metric at two label granularities) get one HELP/TYPE block.
    let mut sorted: Vec<&MetricFamily> = families.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut previous_name: Option<&str> = None;
    for family in sorted {
        if previous_name != Some(family.name.as_str()) {
            if !family.help.is_empty() {
                writeln!(output, "# HELP {} {}", family.name, escape_help(&family.help)).ok();
            }
            writeln!(output, "# TYPE {} gauge", family.name).ok();
            previous_name = Some(family.name.as_str());
        }

        for sample in &family.samples {
            if sample.label_values.len() != family.label_names.len() {
                warn!(
                    family = %family.name,
                    expected = family.label_names.len(),
                    got = sample.label_values.len(),
                    "label arity mismatch, skipping sample"
                );
                continue;
            }

            writeln!(
                output,
                "{}{} {}",
                family.name,
                format_labels(&family.label_names, sample),
                format_value(sample.value)
            )
            .ok();
        }
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters in HELP text.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format one sample's label block.
fn format_labels(names: &[String], sample: &MetricSample) -> String {
    if names.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = names
        .iter()
        .zip(&sample.label_values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}
