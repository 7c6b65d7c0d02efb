//! # apkinfo
//!
//! Rebuilds `AndroidManifest.xml` from a decoded APK manifest, both as document text and
//! as a lazily expanded element tree for display.
//!
//! Decoders hand the manifest over as a nested key/value structure: camelCase keys, arrays
//! for repeated elements and no `android:` prefixes. This crate decides for every key
//! whether it is an attribute or a child element and writes the XML back in the layout
//! real manifests use.
//!
use crate::manifest::tree::{project_manifest, RenderNode};
use crate::manifest::xml::to_xml;
use crate::manifest::{ManifestResult, ManifestValue};

pub mod android;
pub mod manifest;
#[cfg(test)]
mod tests;

/// Serialize a decoded manifest root to `AndroidManifest.xml` text.
///
/// # Examples
///
/// ```
/// use apkinfo::manifest::ManifestValue;
///
/// let manifest = ManifestValue::from_json(r#"{"package":"com.example","usesSdk":{"minSdkVersion":21}}"#).unwrap();
/// let xml = apkinfo::serialize(&manifest).unwrap();
/// assert!(xml.contains(r#"<uses-sdk android:minSdkVersion="21" />"#));
/// ```
pub fn serialize(manifest: &ManifestValue) -> ManifestResult<String> {
    to_xml(manifest)
}

/// Project the `<manifest>` element of a decoded manifest for display. Children are
/// projected on demand through [`RenderNode::child`].
pub fn project(manifest: &ManifestValue) -> ManifestResult<RenderNode<'_>> {
    project_manifest(manifest)
}
