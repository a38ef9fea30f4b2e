//! Indented text rendering of decoded field trees.
//!
//! Nesting depth is passed down explicitly; nothing here keeps state
//! between calls.

use std::fmt::Write;

use hazelshark_core::{AnnotatedField, CaptureReport, FieldTree, FieldValue, Warning, format_hex};

const INDENT: &str = "  ";

/// Render a whole decoded tree, packet warnings first.
pub fn render_tree(tree: &dyn FieldTree) -> String {
    let mut out = String::new();
    for warning in tree.packet_warnings() {
        render_warning(warning, 0, &mut out);
    }
    for field in tree.fields() {
        render_field(field, 0, &mut out);
    }
    out
}

pub fn render_capture(report: &CaptureReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} frames, {} decoded, {} failed, {} skipped",
        report.capture, report.frames_total, report.decoded, report.failed, report.skipped
    );
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "\n#{} {} {} -> {} ({}, {})",
            entry.index,
            entry.timestamp.as_deref().unwrap_or("-"),
            entry.source,
            entry.destination,
            entry.record.kind.as_str(),
            entry.record.direction.as_str()
        );
        match (&entry.decoded, &entry.error) {
            (Some(decoded), _) => out.push_str(&render_tree(decoded.tree())),
            (None, Some(error)) => {
                let _ = writeln!(out, "{INDENT}error: {error}");
            }
            (None, None) => {}
        }
    }
    out
}

fn render_field(field: &AnnotatedField, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    let _ = write!(out, "{indent}{}", field.name);
    if let Some(value) = display_value(&field.value) {
        let _ = write!(out, ": {value}");
    }
    if let Some(label) = &field.label {
        let _ = write!(out, " ({label})");
    }
    let _ = writeln!(
        out,
        " [{}..{}]",
        field.range.start,
        field.range.end()
    );
    for warning in &field.warnings {
        render_warning(warning, depth + 1, out);
    }
    for child in &field.children {
        render_field(child, depth + 1, out);
    }
}

fn render_warning(warning: &Warning, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{}! {}", INDENT.repeat(depth), warning);
}

fn display_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Unsigned(v) => Some(v.to_string()),
        FieldValue::Signed(v) => Some(v.to_string()),
        FieldValue::Float(v) => Some(format!("{v:.3}")),
        FieldValue::Bool(v) => Some(v.to_string()),
        FieldValue::Text(v) => Some(format!("{v:?}")),
        FieldValue::Bytes(v) => Some(format_hex(v)),
        FieldValue::None => None,
    }
}
