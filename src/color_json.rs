//! Purpose: Render revived trees as pretty JSON with optional ANSI colorization for CLI output.
//! Exports: colorize_revived.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty(&value.to_display_json()).
//! Invariants: Secrets render as the mask; ANSI escapes appear only when explicitly enabled.
use lc_revive::api::{Revived, SECRET_MASK, Serializable};
use std::collections::BTreeMap;

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";
const COLOR_SECRET: &str = "31";
const COLOR_INSTANCE: &str = "34";

pub fn colorize_revived(value: &Revived, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Revived, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Revived::Null => push_colored("null", COLOR_NULL, use_color, out),
        Revived::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Revived::Number(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        Revived::String(text) => push_colored(&quote(text), COLOR_STRING, use_color, out),
        Revived::Secret(_) => push_colored(&quote(SECRET_MASK), COLOR_SECRET, use_color, out),
        Revived::Array(items) => write_array(items, indent, use_color, out),
        Revived::Object(map) => write_object(map, indent, use_color, out),
        Revived::Instance(instance) => write_instance(instance.as_ref(), indent, use_color, out),
    }
}

fn write_array(items: &[Revived], indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_object(map: &BTreeMap<String, Revived>, indent: usize, use_color: bool, out: &mut String) {
    if map.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = map.len();
    for (idx, (key, value)) in map.iter().enumerate() {
        write_key(key, indent + 1, use_color, out);
        write_value(value, indent + 1, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

// Same shape as `Revived::to_display_json` for instances: {"instance": .., "repr": ..}.
fn write_instance(instance: &dyn Serializable, indent: usize, use_color: bool, out: &mut String) {
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    write_key("instance", indent + 1, use_color, out);
    push_colored(&quote(instance.type_name()), COLOR_INSTANCE, use_color, out);
    push_colored(",", COLOR_PUNCT, use_color, out);
    out.push('\n');
    write_key("repr", indent + 1, use_color, out);
    push_colored(&quote(&format!("{instance:?}")), COLOR_STRING, use_color, out);
    out.push('\n');
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn write_key(key: &str, indent: usize, use_color: bool, out: &mut String) {
    push_indent(indent, out);
    push_colored(&quote(key), COLOR_KEY, use_color, out);
    push_colored(":", COLOR_PUNCT, use_color, out);
    out.push(' ');
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
