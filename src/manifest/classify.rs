//! Attribute/child classification of decoded manifest keys.
//!
//! The decoder flattens `AndroidManifest.xml` into camelCase keys: repeated elements become
//! plural array keys (`activities`), single elements become objects (`usesSdk`) and the
//! `android:` prefix is lost. The tables below are the only knowledge used to put the XML
//! back together, and [`partition`] is the single place that applies them so the XML
//! writer and the tree view can never disagree.

use crate::manifest::value::{ManifestNode, ManifestValue, Scalar};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

pub const ANDROID_NAMESPACE_PREFIX: &str = "android";
pub const ANDROID_NAMESPACE_URI: &str = "http://schemas.android.com/apk/res/android";
/// Attribute injected on the root element to declare the `android` prefix.
pub const ANDROID_NAMESPACE_DECLARATION: &str = "xmlns:android";
pub const ROOT_TAG: &str = "manifest";

/// Framework attributes that are written back with the `android:` prefix. Closed set: any
/// other key is an ordinary unprefixed attribute.
static ANDROID_ATTRIBUTES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "name",
        "label",
        "icon",
        "theme",
        "versionCode",
        "versionName",
        "minSdkVersion",
        "targetSdkVersion",
        "allowBackup",
        "supportsRtl",
        "exported",
        "enabled",
        "permission",
        "authorities",
        "resource",
        "value",
        "configChanges",
        "screenOrientation",
        "launchMode",
        "hardwareAccelerated",
        "windowSoftInputMode",
        "grantUriPermissions",
        "fullBackupContent",
        "appComponentFactory",
        "roundIcon",
        "networkSecurityConfig",
        "debuggable",
        "directBootAware",
        "required",
        "glEsVersion",
    ]
    .into_iter()
    .collect()
});

/// How a decoded key maps back onto XML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Plain attribute, written under its own name.
    Attribute,
    /// Framework attribute, written as `android:<key>`.
    NamespacedAttribute,
    /// Child element(s) with this tag name; arrays give one element per item.
    NamedChild(&'static str),
    /// Convenience data derived by the decoder. Never written.
    SuppressedChild,
}

/// Child element tag for a key, if the key holds child elements.
fn child_mapping(key: &str) -> Option<KeyKind> {
    let tag = match key {
        "application" => "application",
        "usesPermissions" => "uses-permission",
        "usesPermissionsSDK23" => "uses-permission-sdk-23",
        "permissions" => "permission",
        "permissionTrees" => "permission-tree",
        "permissionGroups" => "permission-group",
        "usesFeatures" => "uses-feature",
        "usesSdk" => "uses-sdk",
        "usesConfiguration" => "uses-configuration",
        "usesLibraries" => "uses-library",
        "supportsScreens" => "supports-screens",
        "compatibleScreens" => "compatible-screens",
        "supportsGlTextures" => "supports-gl-texture",
        "activities" => "activity",
        "activityAliases" => "activity-alias",
        "services" => "service",
        "receivers" => "receiver",
        "providers" => "provider",
        "intentFilters" => "intent-filter",
        "metaData" => "meta-data",
        "actions" => "action",
        "categories" => "category",
        "grantUriPermissions" => "grant-uri-permission",
        "pathPermissions" => "path-permission",
        "data" => "data",
        "launcherActivities" => return Some(KeyKind::SuppressedChild),
        _ => return None,
    };
    Some(KeyKind::NamedChild(tag))
}

/// Classify a decoded key. The child table takes precedence over the attribute whitelist,
/// so `grantUriPermissions` is always the `<grant-uri-permission>` list.
pub fn classify(key: &str) -> KeyKind {
    if let Some(kind) = child_mapping(key) {
        kind
    } else if ANDROID_ATTRIBUTES.contains(key) {
        KeyKind::NamespacedAttribute
    } else {
        KeyKind::Attribute
    }
}

pub fn is_android_attribute(key: &str) -> bool {
    ANDROID_ATTRIBUTES.contains(key)
}

/// The XML attribute name for an attribute key.
pub fn attribute_name(key: &str) -> Cow<'_, str> {
    if is_android_attribute(key) {
        Cow::Owned(format!("{ANDROID_NAMESPACE_PREFIX}:{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

/// Keys are written verbatim as attribute names, so they have to be XML names without a
/// namespace prefix of their own. Only ASCII names are accepted.
fn is_plain_xml_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Characters XML 1.0 allows in text: tab, newline, carriage return and everything from
/// U+0020 up except U+FFFE and U+FFFF. Surrogates never occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// An attribute ready to be written: qualified name and unescaped text value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child element that has been identified but not yet expanded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildRef<'a> {
    pub tag: &'static str,
    pub node: &'a ManifestNode,
}

/// A node split into its attributes and its child elements, both in key order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition<'a> {
    pub attributes: Vec<Attribute>,
    pub children: Vec<ChildRef<'a>>,
}

impl<'a> Partition<'a> {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Split a node into attributes and children. Entries whose shape contradicts their
/// classification are dropped and logged; the rest of the node is still returned.
pub fn partition(node: &ManifestNode) -> Partition<'_> {
    let mut out = Partition::default();
    for (key, value) in node.entries() {
        push_entry(&mut out, key, value);
    }
    out
}

/// [`partition`] for the `<manifest>` root: the `xmlns:android` declaration comes first and
/// any decoded key of the same name is ignored, so it is declared exactly once.
pub fn partition_root(node: &ManifestNode) -> Partition<'_> {
    let mut out = Partition::default();
    out.attributes.push(Attribute::new(
        ANDROID_NAMESPACE_DECLARATION,
        ANDROID_NAMESPACE_URI,
    ));
    for (key, value) in node.entries() {
        if key == ANDROID_NAMESPACE_DECLARATION {
            debug!("Ignoring decoded {ANDROID_NAMESPACE_DECLARATION}, the canonical declaration is used");
            continue;
        }
        push_entry(&mut out, key, value);
    }
    out
}

fn push_entry<'a>(out: &mut Partition<'a>, key: &str, value: &'a ManifestValue) {
    match (classify(key), value) {
        (KeyKind::SuppressedChild, _) => {
            debug!("Skipping derived key '{key}'");
        }
        (KeyKind::NamedChild(tag), ManifestValue::Node(child)) => {
            out.children.push(ChildRef { tag, node: child });
        }
        (KeyKind::NamedChild(tag), ManifestValue::Sequence(items)) => {
            out.children
                .extend(items.iter().map(|child| ChildRef { tag, node: child }));
        }
        (KeyKind::NamedChild(tag), ManifestValue::Scalar(Scalar::Null)) => {
            debug!("No <{tag}> element for null '{key}'");
        }
        (KeyKind::NamedChild(tag), ManifestValue::Scalar(_)) => {
            warn!("Dropping '{key}': <{tag}> elements cannot hold a scalar value");
        }
        (KeyKind::Attribute | KeyKind::NamespacedAttribute, ManifestValue::Scalar(scalar)) => {
            let Some(text) = scalar.to_text() else {
                return;
            };
            if !is_plain_xml_name(key) {
                warn!("Dropping attribute '{key}': not a valid XML attribute name");
                return;
            }
            if let Some(bad) = text.chars().find(|&c| !is_xml_char(c)) {
                warn!(
                    "Dropping attribute '{key}': value contains U+{:04X}, which XML cannot represent",
                    bad as u32
                );
                return;
            }
            out.attributes
                .push(Attribute::new(attribute_name(key), text.into_owned()));
        }
        (KeyKind::Attribute | KeyKind::NamespacedAttribute, other) => {
            warn!(
                "Dropping '{key}': {} value under a key with no element mapping",
                other.kind()
            );
        }
    }
}
