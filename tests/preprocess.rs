//! End-to-end diagram preprocessing with a real child process.
//!
//! A small shell script stands in for the Mermaid CLI: it copies the input
//! to the output path, or fails when the source contains `FAIL`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vibe_site::config::{DiagramsConfig, RendererConfig};
use vibe_site::diagrams::{DiagramEvent, preprocess};

const FAKE_RENDERER: &str = r#"#!/bin/sh
# usage: fake-mmdc -i <input> -o <output> -b <bg> -s <scale>
if grep -q FAIL "$2"; then
    echo "Parse error: unexpected FAIL" >&2
    exit 1
fi
cp "$2" "$4"
"#;

struct Site {
    tmp: TempDir,
    settings: DiagramsConfig,
}

impl Site {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("fake-mmdc");
        fs::write(&script, FAKE_RENDERER).unwrap();

        let settings = DiagramsConfig {
            renderer: RendererConfig {
                // Run through sh so the script never needs the exec bit
                command: vec!["sh".to_string(), script.display().to_string()],
                timeout_secs: 10,
                ..RendererConfig::default()
            },
            ..DiagramsConfig::default()
        };
        Self { tmp, settings }
    }

    fn docs(&self) -> PathBuf {
        self.tmp.path().join("til")
    }

    fn images(&self) -> PathBuf {
        self.tmp.path().join("public/mermaid")
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.docs().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }
}

fn image_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn two_blocks_become_two_images() {
    let site = Site::new();
    let doc = site.write(
        "kvm.md",
        "# KVM\n```mermaid\ngraph TD\nA --> B\n```\nbetween\n```mermaid\ngraph LR\nC --> D\n```\n",
    );

    let summary = preprocess(&site.docs(), &site.images(), &site.settings, None).unwrap();

    assert_eq!(summary.rendered, 2);
    assert_eq!(summary.rewritten, 1);

    let images = image_names(&site.images());
    assert_eq!(images.len(), 2);
    let text = fs::read_to_string(doc).unwrap();
    for name in &images {
        assert!(text.contains(&format!("![Diagram](/mermaid/{name})")));
    }
    assert!(!text.contains("```mermaid"));

    // The fake renderer copies its input, so the image holds the block body
    let bodies: Vec<String> = images
        .iter()
        .map(|n| fs::read_to_string(site.images().join(n)).unwrap())
        .collect();
    assert!(bodies.contains(&"graph TD\nA --> B".to_string()));
    assert!(bodies.contains(&"graph LR\nC --> D".to_string()));
}

#[test]
fn failing_block_is_preserved_and_reported() {
    let site = Site::new();
    let original = "```mermaid\ngraph TD\nFAIL\n```\n";
    let doc = site.write("broken.md", original);
    let (tx, rx) = std::sync::mpsc::channel();

    let summary = preprocess(&site.docs(), &site.images(), &site.settings, Some(tx)).unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read_to_string(doc).unwrap(), original);
    assert!(image_names(&site.images()).is_empty());

    let failure = rx
        .iter()
        .find_map(|e| match e {
            DiagramEvent::DiagramFailed { reason, .. } => Some(reason),
            _ => None,
        })
        .expect("a failure event");
    assert!(failure.contains("Parse error"));
}

#[test]
fn missing_renderer_is_not_fatal() {
    let mut site = Site::new();
    site.settings.renderer.command = vec!["/nonexistent/mmdc".to_string()];
    let original = "```mermaid\nA\n```";
    let doc = site.write("note.md", original);

    let summary = preprocess(&site.docs(), &site.images(), &site.settings, None).unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read_to_string(doc).unwrap(), original);
}

#[test]
fn documents_without_diagrams_are_byte_identical() {
    let site = Site::new();
    let original = "# Note\r\n\r\nNo diagrams, CRLF endings, no trailing newline";
    let doc = site.write("plain.md", original);

    let summary = preprocess(&site.docs(), &site.images(), &site.settings, None).unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.rewritten, 0);
    assert_eq!(fs::read(doc).unwrap(), original.as_bytes());
}

#[test]
fn rewritten_document_keeps_permissions() {
    let site = Site::new();
    let doc = site.write("note.md", "```mermaid\nA\n```");
    fs::set_permissions(&doc, fs::Permissions::from_mode(0o640)).unwrap();

    preprocess(&site.docs(), &site.images(), &site.settings, None).unwrap();

    let mode = fs::metadata(&doc).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
