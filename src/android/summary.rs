use crate::android::package::FileInfo;
use crate::manifest::value::{ManifestNode, Scalar};
use log::debug;
use serde::Serialize;

pub const UNKNOWN_LABEL: &str = "Unknown application";
pub const NOT_AVAILABLE: &str = "N/A";

/// Headline facts about a package, as shown on the basic information page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApkSummary {
    pub label: String,
    pub package: Option<String>,
    pub version_name: Option<String>,
    pub version_code: Option<String>,
    pub min_sdk: String,
    pub target_sdk: String,
    pub main_activity: Option<String>,
    pub launch_command: Option<String>,
}

fn scalar_text(node: &ManifestNode, key: &str) -> Option<String> {
    node.get_scalar(key)
        .and_then(Scalar::to_text)
        .map(|text| text.into_owned())
}

impl ApkSummary {
    pub fn from_manifest(manifest: &ManifestNode) -> Self {
        let application = manifest.get_node("application");
        let label = application
            .and_then(|app| app.get_str("label"))
            .unwrap_or(UNKNOWN_LABEL)
            .to_string();
        let package = scalar_text(manifest, "package");

        let uses_sdk = manifest.get_node("usesSdk");
        let sdk = |key: &str| {
            uses_sdk
                .and_then(|node| scalar_text(node, key))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        // The decoder lists activities carrying the MAIN/LAUNCHER filter separately.
        let main_activity = application
            .and_then(|app| app.get_sequence("launcherActivities"))
            .and_then(|activities| activities.first())
            .and_then(|activity| scalar_text(activity, "name"));
        let launch_command = main_activity.as_ref().map(|activity| {
            format!(
                "am start -n {}/{activity}",
                package.as_deref().unwrap_or(NOT_AVAILABLE)
            )
        });

        ApkSummary {
            label,
            package,
            version_name: scalar_text(manifest, "versionName"),
            version_code: scalar_text(manifest, "versionCode"),
            min_sdk: sdk("minSdkVersion"),
            target_sdk: sdk("targetSdkVersion"),
            main_activity,
            launch_command,
        }
    }

    /// Plain-text report of the summary and, when known, the file facts.
    pub fn report_text(&self, file: Option<&FileInfo>) -> String {
        let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let mut lines = vec![
            format!("Application: {}", self.label),
            format!("Package: {}", or_na(&self.package)),
            format!("VersionName: {}", or_na(&self.version_name)),
            format!("VersionCode: {}", or_na(&self.version_code)),
            format!("Min SDK: {}", self.min_sdk),
            format!("Target SDK: {}", self.target_sdk),
        ];
        if let (Some(activity), Some(command)) = (&self.main_activity, &self.launch_command) {
            lines.push(format!("Main activity: {activity}"));
            lines.push(format!("Launch command: {command}"));
        }
        if let Some(file) = file {
            lines.push(format!("File size: {}", file.size_text()));
            lines.push(format!("MD5: {}", file.digests.md5()));
            lines.push(format!("SHA-1: {}", file.digests.sha1()));
            lines.push(format!("SHA-256: {}", file.digests.sha256()));
        }
        lines.join("\n")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ComponentKind {
    Activity,
    Service,
    Receiver,
    Provider,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Activity,
        ComponentKind::Service,
        ComponentKind::Receiver,
        ComponentKind::Provider,
    ];

    /// Decoded key under `application` listing components of this kind.
    pub fn manifest_key(self) -> &'static str {
        match self {
            ComponentKind::Activity => "activities",
            ComponentKind::Service => "services",
            ComponentKind::Receiver => "receivers",
            ComponentKind::Provider => "providers",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ComponentKind::Activity => "Activity",
            ComponentKind::Service => "Service",
            ComponentKind::Receiver => "Receiver",
            ComponentKind::Provider => "Provider",
        }
    }

    pub fn empty_text(self) -> &'static str {
        match self {
            ComponentKind::Activity => "No activities",
            ComponentKind::Service => "No services",
            ComponentKind::Receiver => "No broadcast receivers",
            ComponentKind::Provider => "No content providers",
        }
    }

    /// `am` invocation that targets a component of this kind, completed with
    /// ` -n <package>/<component>`. Providers cannot be started from `am`.
    pub fn command_prefix(self) -> Option<&'static str> {
        match self {
            ComponentKind::Activity => Some("am start"),
            ComponentKind::Service => Some("am startservice"),
            ComponentKind::Receiver => {
                Some("am broadcast -a android.intent.action.BOOT_COMPLETED")
            }
            ComponentKind::Provider => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComponentEntry {
    pub name: String,
    pub command: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComponentSection {
    pub kind: ComponentKind,
    pub entries: Vec<ComponentEntry>,
}

impl ComponentSection {
    pub fn heading(&self) -> String {
        format!("{} ({})", self.kind.title(), self.entries.len())
    }
}

/// Activities, services, receivers and providers declared by the application, in
/// manifest order.
pub fn component_sections(manifest: &ManifestNode) -> Vec<ComponentSection> {
    let package = scalar_text(manifest, "package");
    let application = manifest.get_node("application");
    ComponentKind::ALL
        .into_iter()
        .map(|kind| {
            let items = application
                .and_then(|app| app.get_sequence(kind.manifest_key()))
                .unwrap_or(&[]);
            let entries = items
                .iter()
                .filter_map(|item| {
                    let Some(name) = scalar_text(item, "name") else {
                        debug!("Skipping unnamed {} entry", kind.title());
                        return None;
                    };
                    let command = match (kind.command_prefix(), package.as_deref()) {
                        (Some(prefix), Some(package)) => {
                            Some(format!("{prefix} -n {package}/{name}"))
                        }
                        _ => None,
                    };
                    Some(ComponentEntry { name, command })
                })
                .collect();
            ComponentSection { kind, entries }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::value::ManifestValue;

    fn manifest() -> ManifestNode {
        ManifestValue::from_json(
            r#"{
                "package": "com.example.app",
                "versionCode": 42,
                "versionName": "1.4.2",
                "usesSdk": { "minSdkVersion": 21, "targetSdkVersion": 34 },
                "application": {
                    "label": "Example",
                    "activities": [ { "name": ".MainActivity" }, { "name": ".SettingsActivity" } ],
                    "services": [ { "name": ".SyncService" } ],
                    "receivers": [ { "name": ".BootReceiver" }, { "exported": false } ],
                    "providers": [ { "name": ".FilesProvider", "authorities": "com.example.files" } ],
                    "launcherActivities": [ { "name": ".MainActivity" } ]
                }
            }"#,
        )
        .expect("parse manifest json")
        .as_node()
        .cloned()
        .expect("object root")
    }

    #[test]
    fn summary_fields() {
        let summary = ApkSummary::from_manifest(&manifest());
        assert_eq!(summary.label, "Example");
        assert_eq!(summary.package.as_deref(), Some("com.example.app"));
        assert_eq!(summary.version_code.as_deref(), Some("42"));
        assert_eq!(summary.min_sdk, "21");
        assert_eq!(summary.target_sdk, "34");
        assert_eq!(summary.main_activity.as_deref(), Some(".MainActivity"));
        assert_eq!(
            summary.launch_command.as_deref(),
            Some("am start -n com.example.app/.MainActivity")
        );
    }

    #[test]
    fn summary_defaults() {
        let summary = ApkSummary::from_manifest(
            &ManifestNode::new().with("application", ManifestNode::new().with("label", 0x7f0e0001)),
        );
        assert_eq!(summary.label, UNKNOWN_LABEL);
        assert_eq!(summary.package, None);
        assert_eq!(summary.min_sdk, NOT_AVAILABLE);
        assert_eq!(summary.main_activity, None);
        assert_eq!(summary.launch_command, None);
    }

    #[test]
    fn report_without_file() {
        let text = ApkSummary::from_manifest(&manifest()).report_text(None);
        let expected = [
            "Application: Example",
            "Package: com.example.app",
            "VersionName: 1.4.2",
            "VersionCode: 42",
            "Min SDK: 21",
            "Target SDK: 34",
            "Main activity: .MainActivity",
            "Launch command: am start -n com.example.app/.MainActivity",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn components_with_commands() {
        let sections = component_sections(&manifest());
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].heading(), "Activity (2)");
        assert_eq!(
            sections[0].entries[1].command.as_deref(),
            Some("am start -n com.example.app/.SettingsActivity")
        );
        assert_eq!(
            sections[1].entries[0].command.as_deref(),
            Some("am startservice -n com.example.app/.SyncService")
        );
        assert_eq!(sections[2].entries.len(), 1);
        assert_eq!(
            sections[2].entries[0].command.as_deref(),
            Some("am broadcast -a android.intent.action.BOOT_COMPLETED -n com.example.app/.BootReceiver")
        );
        assert_eq!(sections[3].entries[0].name, ".FilesProvider");
        assert_eq!(sections[3].entries[0].command, None);
    }

    #[test]
    fn components_without_application() {
        let sections = component_sections(&ManifestNode::new().with("package", "com.example"));
        assert!(sections.iter().all(|section| section.entries.is_empty()));
        assert_eq!(sections[3].kind.empty_text(), "No content providers");
    }
}
