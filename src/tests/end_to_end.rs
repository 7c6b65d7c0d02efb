use std::fs;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::manifest::value::{ManifestNode, ManifestValue};
use crate::manifest::view::TreeView;
use crate::manifest::ANDROID_NAMESPACE_URI;
use crate::{project, serialize};

fn example_manifest() -> ManifestValue {
    ManifestValue::from_json(
        r#"{
            "package": "com.example.app",
            "versionName": "1.0",
            "usesSdk": { "minSdkVersion": 21, "targetSdkVersion": 30 },
            "application": {
                "label": "Example",
                "activities": [ { "name": ".MainActivity", "exported": true } ]
            }
        }"#,
    )
    .expect("parse example manifest")
}

#[test]
fn serializes_example_app() {
    let xml = serialize(&example_manifest()).expect("serialize manifest");
    let expected = [
        r#"<?xml version="1.0" encoding="utf-8"?>"#,
        "<manifest",
        r#"    xmlns:android="http://schemas.android.com/apk/res/android""#,
        r#"    package="com.example.app""#,
        r#"    android:versionName="1.0""#,
        "    >",
        r#"    <uses-sdk android:minSdkVersion="21" android:targetSdkVersion="30" />"#,
        r#"    <application android:label="Example">"#,
        r#"        <activity android:name=".MainActivity" android:exported="true" />"#,
        "    </application>",
        "</manifest>",
    ]
    .join("\n");
    assert_eq!(xml, expected);
}

#[test]
fn serializes_fixture_like_golden_file() {
    let json = fs::read_to_string("tests/fixtures/notes_manifest.json").expect("read json fixture");
    let expected = fs::read_to_string("tests/fixtures/notes_manifest.xml").expect("read xml fixture");
    let manifest = ManifestValue::from_json(&json).expect("parse fixture");
    let xml = serialize(&manifest).expect("serialize manifest");
    assert_eq!(xml, expected.trim_end());
}

#[test]
fn namespace_declared_exactly_once() {
    for root in [
        ManifestNode::new(),
        ManifestNode::new().with("package", "com.example"),
        ManifestNode::new()
            .with("xmlns:android", ANDROID_NAMESPACE_URI)
            .with("package", "com.example"),
        ManifestNode::new().with("xmlns:android", "urn:wrong"),
    ] {
        let xml = serialize(&ManifestValue::from(root)).expect("serialize manifest");
        let declaration = format!(r#"xmlns:android="{ANDROID_NAMESPACE_URI}""#);
        assert_eq!(xml.matches("xmlns:android").count(), 1, "{xml}");
        assert_eq!(xml.matches(&declaration).count(), 1, "{xml}");
    }
}

#[test]
fn suppressed_key_never_appears() {
    let manifest = ManifestValue::from(
        ManifestNode::new().with("package", "com.example").with(
            "application",
            ManifestNode::new()
                .with("label", "Example")
                .with("activities", vec![ManifestNode::new().with("name", ".Visible")])
                .with(
                    "launcherActivities",
                    vec![ManifestNode::new().with("name", ".OnlyInLauncherList")],
                ),
        ),
    );

    let xml = serialize(&manifest).expect("serialize manifest");
    assert!(xml.contains(r#"<activity android:name=".Visible" />"#));
    assert!(!xml.contains("OnlyInLauncherList"));
    assert!(!xml.contains("launcher"));

    let root = project(&manifest).expect("project manifest");
    let mut view = TreeView::new();
    view.expand_all(&root);
    let text = view.render_text(&root);
    assert!(text.contains(".Visible"));
    assert!(!text.contains("OnlyInLauncherList"));
}

#[test]
fn escaped_values_read_back_unchanged() {
    let label = r#"Tom & Jerry's <"Best"> & &amp; co"#;
    let manifest = ManifestValue::from(
        ManifestNode::new()
            .with("package", "com.example")
            .with("application", ManifestNode::new().with("label", label)),
    );
    let xml = serialize(&manifest).expect("serialize manifest");
    assert!(xml.contains("&amp;amp;"));

    let mut reader = Reader::from_str(&xml);
    let mut found = None;
    loop {
        match reader.read_event().expect("well-formed xml") {
            Event::Start(start) | Event::Empty(start) if start.name().as_ref() == b"application" => {
                for attr in start.attributes() {
                    let attr = attr.expect("valid attribute");
                    if attr.key.as_ref() == b"android:label" {
                        found = Some(attr.unescape_value().expect("unescape").into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    assert_eq!(found.as_deref(), Some(label));
}

#[test]
fn empty_elements_self_close_without_padding() {
    let manifest = ManifestValue::from(
        ManifestNode::new()
            .with("supportsScreens", ManifestNode::new())
            .with("application", ManifestNode::new()),
    );
    let xml = serialize(&manifest).expect("serialize manifest");
    let lines: Vec<&str> = xml.lines().collect();
    assert_eq!(lines[1], r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">"#);
    assert_eq!(lines[2], "    <supports-screens />");
    assert_eq!(lines[3], "    <application />");
    assert_eq!(lines[4], "</manifest>");
}

#[test]
fn missing_root_is_an_error() {
    let text = "null";
    let manifest = ManifestValue::from_json(text).expect("parse null");
    assert!(serialize(&manifest).is_err());
    assert!(project(&manifest).is_err());
}

#[test]
fn unrepresentable_entries_are_left_out() {
    let manifest = ManifestValue::from(
        ManifestNode::new()
            .with("package", "com.example")
            .with("a\u{b2}", "x")
            .with("application", ManifestNode::new().with("label", "Bad\u{1}Name")),
    );
    let xml = serialize(&manifest).expect("serialize manifest");
    let lines: Vec<&str> = xml.lines().collect();
    assert_eq!(
        lines[1..],
        [
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example">"#,
            "    <application />",
            "</manifest>",
        ]
    );
    assert!(xml.is_ascii());
}
