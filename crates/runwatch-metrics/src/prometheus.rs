//! Prometheus text exposition format.
//!
//! Renders the counter registry for scraping by a Prometheus server or
//! compatible agent.

use std::fmt::Write;

use crate::classify::Category;
use crate::counters::CounterRegistry;

/// Content type of [`render_prometheus`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every counter family into Prometheus text format.
///
/// Each family gets HELP and TYPE lines even when it has no samples.
pub fn render_prometheus(registry: &CounterRegistry) -> String {
    let mut out = String::new();

    for category in Category::ALL {
        let name = category.metric_name();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "# HELP {name} {}", category.help());
        let _ = writeln!(out, "# TYPE {name} counter");
        for sample in registry.samples(category) {
            let _ = writeln!(
                out,
                "{name}{{repository_name=\"{}\",workflow_id=\"{}\"}} {}",
                escape_label(&sample.repository),
                escape_label(&sample.workflow),
                sample.value
            );
        }
    }

    out
}

/// Escape a label value: backslash, double quote, and newline.
fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
