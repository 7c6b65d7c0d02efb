use std::env;
use std::error::Error;
use std::fs;

use apkinfo::android::ApkSummary;
use apkinfo::manifest::{ManifestValue, TreeView};
use apkinfo::{project, serialize};

// Prints the AndroidManifest.xml rebuilt from a decoded manifest JSON file.
// With --tree the fully expanded tree view is printed instead, with --summary the basic info.

//Usage: manifest2xml <manifest.json> [--tree|--summary]
fn main()
{
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: manifest2xml <manifest.json> [--tree|--summary]");
        return;
    }

    match run(&args[1], args.get(2).map(String::as_str)) {
        Ok(text) => { println!("{text}"); }
        Err(e) => { println!("Aborted due to error: {e}"); }
    }
}

fn run(path: &str, mode: Option<&str>) -> Result<String, Box<dyn Error>>
{
    let text = fs::read_to_string(path)?;
    let manifest = ManifestValue::from_json(&text)?;

    match mode {
        Some("--tree") => {
            let root = project(&manifest)?;
            let mut view = TreeView::new();
            view.expand_all(&root);
            Ok(view.render_text(&root))
        }
        Some("--summary") => {
            let node = manifest.as_node().ok_or("manifest root is not an object")?;
            Ok(ApkSummary::from_manifest(node).report_text(None))
        }
        _ => Ok(serialize(&manifest)?),
    }
}
