//! Reconstruction of `AndroidManifest.xml` from a decoded manifest.
//!
//! [`value`] holds the decoded input, [`classify`] decides what every key becomes in XML,
//! [`xml`] writes the document text and [`tree`] builds the lazily expanded element tree
//! that [`view`] displays.

pub mod classify;
pub mod error;
pub mod tree;
pub mod value;
pub mod view;
pub mod xml;

pub use classify::{Attribute, ChildRef, KeyKind, ANDROID_NAMESPACE_URI};
pub use error::{ManifestError, ManifestResult};
pub use tree::{RenderNode, RenderTree};
pub use value::{ManifestNode, ManifestValue, Scalar};
pub use view::{NodePath, TreeView};
