use crate::android::summary::{component_sections, ApkSummary, ComponentSection};
use crate::manifest::error::{ManifestError, ManifestResult};
use crate::manifest::tree::{project_manifest, RenderNode};
use crate::manifest::value::{ManifestNode, ManifestValue};
use crate::manifest::xml::to_xml;
use chrono::{DateTime, Local};
use log::{debug, info};
use serde::Serialize;

/// A package handed over by the host: raw bytes plus what the file system knows about it.
#[derive(Clone, Debug)]
pub struct PackageFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub last_modified: DateTime<Local>,
}

impl PackageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, last_modified: DateTime<Local>) -> Self {
        PackageFile {
            name: name.into(),
            bytes,
            last_modified,
        }
    }
}

/// What a package decoder extracts from an APK.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPackage {
    pub manifest: ManifestValue,
    /// Displayable reference to the launcher icon (e.g. a data URL), if there is one.
    pub icon: Option<String>,
}

/// Turns APK bytes into a decoded manifest. Implemented outside this crate.
pub trait PackageDecoder {
    fn decode(&self, bytes: &[u8]) -> ManifestResult<DecodedPackage>;
}

impl<F> PackageDecoder for F
where
    F: Fn(&[u8]) -> ManifestResult<DecodedPackage>,
{
    fn decode(&self, bytes: &[u8]) -> ManifestResult<DecodedPackage> {
        self(bytes)
    }
}

const MD5_HEX_LEN: usize = 32;
const SHA1_HEX_LEN: usize = 40;
const SHA256_HEX_LEN: usize = 64;

/// Hex digests of a whole package file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileDigests {
    md5: String,
    sha1: String,
    sha256: String,
}

fn check_digest(algorithm: &'static str, value: String, expected: usize) -> ManifestResult<String> {
    if value.len() != expected || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ManifestError::InvalidDigest {
            algorithm,
            expected,
            found: value.len(),
        });
    }
    Ok(value.to_ascii_lowercase())
}

impl FileDigests {
    pub fn new(
        md5: impl Into<String>,
        sha1: impl Into<String>,
        sha256: impl Into<String>,
    ) -> ManifestResult<Self> {
        Ok(FileDigests {
            md5: check_digest("MD5", md5.into(), MD5_HEX_LEN)?,
            sha1: check_digest("SHA-1", sha1.into(), SHA1_HEX_LEN)?,
            sha256: check_digest("SHA-256", sha256.into(), SHA256_HEX_LEN)?,
        })
    }

    pub fn md5(&self) -> &str {
        &self.md5
    }

    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// Computes [`FileDigests`] over package bytes. Implemented outside this crate.
pub trait ContentDigester {
    fn digest(&self, bytes: &[u8]) -> ManifestResult<FileDigests>;
}

/// File facts shown next to the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: usize,
    pub last_modified: DateTime<Local>,
    pub digests: FileDigests,
}

impl FileInfo {
    /// Size in kilobytes with two decimals, e.g. `1.50 KB`.
    pub fn size_text(&self) -> String {
        format!("{:.2} KB", self.size_bytes as f64 / 1024.0)
    }

    pub fn modified_text(&self) -> String {
        self.last_modified.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Which text the "copy" action yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// The summary and file facts.
    Summary,
    /// The reconstructed `AndroidManifest.xml`.
    Xml,
}

/// Everything the viewer shows for one package.
#[derive(Clone, Debug, Serialize)]
pub struct ApkReport {
    pub file: FileInfo,
    pub icon: Option<String>,
    pub manifest: ManifestValue,
    pub summary: ApkSummary,
    pub components: Vec<ComponentSection>,
}

impl ApkReport {
    fn root(&self) -> ManifestResult<&ManifestNode> {
        self.manifest
            .as_node()
            .ok_or(ManifestError::MissingRoot(self.manifest.kind()))
    }

    pub fn manifest_xml(&self) -> ManifestResult<String> {
        to_xml(&self.manifest)
    }

    pub fn tree(&self) -> ManifestResult<RenderNode<'_>> {
        project_manifest(&self.manifest)
    }

    pub fn copy_text(&self, kind: ReportKind) -> ManifestResult<String> {
        match kind {
            ReportKind::Summary => Ok(self.summary.report_text(Some(&self.file))),
            ReportKind::Xml => self.manifest_xml(),
        }
    }

    /// The `application` element, if the manifest has one.
    pub fn application(&self) -> Option<&ManifestNode> {
        self.root().ok().and_then(|root| root.get_node("application"))
    }
}

/// Decode and digest `file`, then derive the summary and component views.
///
/// Fails with [`ManifestError::MissingRoot`] when the decoder yields no manifest object.
pub fn inspect(
    file: &PackageFile,
    decoder: &impl PackageDecoder,
    digester: &impl ContentDigester,
) -> ManifestResult<ApkReport> {
    debug!("Inspecting {} ({} bytes)", file.name, file.bytes.len());
    let decoded = decoder.decode(&file.bytes)?;
    let root = decoded
        .manifest
        .as_node()
        .ok_or(ManifestError::MissingRoot(decoded.manifest.kind()))?;
    let summary = ApkSummary::from_manifest(root);
    let components = component_sections(root);
    let digests = digester.digest(&file.bytes)?;
    info!(
        "Loaded {} ({})",
        summary.package.as_deref().unwrap_or(&file.name),
        summary.version_name.as_deref().unwrap_or("unknown version")
    );

    Ok(ApkReport {
        file: FileInfo {
            name: file.name.clone(),
            size_bytes: file.bytes.len(),
            last_modified: file.last_modified,
            digests,
        },
        icon: decoded.icon,
        manifest: decoded.manifest,
        summary,
        components,
    })
}
