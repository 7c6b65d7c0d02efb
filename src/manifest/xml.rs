use crate::manifest::classify::{partition, partition_root, Attribute, Partition, ROOT_TAG};
use crate::manifest::error::{ManifestError, ManifestResult};
use crate::manifest::value::{ManifestNode, ManifestValue};
use log::debug;
use std::borrow::Cow;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Elements with more attributes than this get one attribute per line.
pub const INLINE_ATTRIBUTE_LIMIT: usize = 2;

const INDENT: &str = "    ";

/// Serialize a decoded manifest root to `AndroidManifest.xml` text.
///
/// The root must be an object; anything else is reported as
/// [`ManifestError::MissingRoot`] so the caller can show its own empty state.
pub fn to_xml(root: &ManifestValue) -> ManifestResult<String> {
    match root {
        ManifestValue::Node(node) => Ok(manifest_to_xml(node)),
        other => Err(ManifestError::MissingRoot(other.kind())),
    }
}

/// Serialize a manifest root object, declaration line included. Lines are separated by
/// `\n` without a trailing newline.
pub fn manifest_to_xml(root: &ManifestNode) -> String {
    let mut out = String::from(XML_DECLARATION);
    write_element(&mut out, ROOT_TAG, &partition_root(root), 0);
    debug!("Serialized manifest to {} bytes of XML", out.len());
    out
}

/// Serialize one element and its subtree without the XML declaration, e.g. to copy a
/// single `<activity>` block.
pub fn element_to_xml(tag: &str, node: &ManifestNode) -> String {
    let mut out = String::new();
    write_element(&mut out, tag, &partition(node), 0);
    out
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
}

fn format_attribute(attr: &Attribute) -> String {
    format!("{}=\"{}\"", attr.name, escape_attribute(&attr.value))
}

fn write_element(out: &mut String, tag: &str, parts: &Partition<'_>, depth: usize) {
    let has_children = parts.has_children();

    if parts.attributes.is_empty() && !has_children {
        push_line(out, depth, &format!("<{tag} />"));
        return;
    }

    if parts.attributes.len() <= INLINE_ATTRIBUTE_LIMIT {
        let mut line = format!("<{tag}");
        for attr in &parts.attributes {
            line.push(' ');
            line.push_str(&format_attribute(attr));
        }
        line.push_str(if has_children { ">" } else { " />" });
        push_line(out, depth, &line);
        if !has_children {
            return;
        }
    } else {
        push_line(out, depth, &format!("<{tag}"));
        for attr in &parts.attributes {
            push_line(out, depth + 1, &format_attribute(attr));
        }
        push_line(out, depth + 1, if has_children { ">" } else { "/>" });
        if !has_children {
            return;
        }
    }

    for child in &parts.children {
        write_element(out, child.tag, &partition(child.node), depth + 1);
    }

    push_line(out, depth, &format!("</{tag}>"));
}
