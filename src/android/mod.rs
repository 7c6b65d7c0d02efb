//! The package side of the viewer: collaborator interfaces for decoding and digesting an
//! APK, and the summary views derived from its manifest.

pub mod package;
pub mod summary;

pub use package::{
    inspect, ApkReport, ContentDigester, DecodedPackage, FileDigests, FileInfo, PackageDecoder,
    PackageFile, ReportKind,
};
pub use summary::{component_sections, ApkSummary, ComponentEntry, ComponentKind, ComponentSection};
