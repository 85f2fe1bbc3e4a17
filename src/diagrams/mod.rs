//! Diagram preprocessing.
//!
//! Walks a document tree, renders every fenced diagram block to an image, and
//! rewrites each document so the block is replaced by an image reference:
//!
//! ````text
//! ```mermaid                          (blank)
//! graph TD               ──────►      ![Diagram](/mermaid/diagram-1718000000000-0.svg)
//!     A --> B                         (blank)
//! ```
//! ````
//!
//! A block that fails to render stays in the document exactly as written. A
//! render failure is logged and counted, never fatal. Documents with no
//! diagram blocks are not touched on disk. Rewrites go through a temporary
//! file in the same directory followed by a rename, so a crash mid-write never
//! leaves a truncated document behind.
//!
//! ## Module Layout
//!
//! - [`extract`]: line scanner that finds fenced blocks
//! - [`naming`]: unique output file names
//! - [`renderer`]: [`DiagramRenderer`] trait and the CLI implementation
//!
//! ## Progress Events
//!
//! [`preprocess`] optionally takes a channel sender and reports
//! [`DiagramEvent`]s as it goes. The CLI drains them on a printer thread.

pub mod extract;
pub mod naming;
pub mod renderer;

pub use extract::{DiagramBlock, Segment, count_blocks, scan};
pub use naming::DiagramNamer;
pub use renderer::{CliRenderer, DiagramRenderer, RenderError};

use crate::config::DiagramsConfig;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
    #[error("Cannot walk document tree: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> DiagramError + '_ {
    move |source| DiagramError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Progress reported while preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramEvent {
    DocumentStarted {
        path: PathBuf,
        blocks: usize,
    },
    DiagramRendered {
        document: PathBuf,
        /// One-based line of the opening fence.
        line: usize,
        public_path: String,
    },
    DiagramFailed {
        document: PathBuf,
        line: usize,
        reason: String,
    },
    DocumentRewritten {
        path: PathBuf,
        rendered: usize,
    },
}

/// Totals for one preprocessing run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessSummary {
    /// Documents with the configured extension that were read.
    pub documents: usize,
    /// Documents written back because at least one block rendered.
    pub rewritten: usize,
    pub rendered: usize,
    pub failed: usize,
}

/// Where and how a run writes its images.
#[derive(Debug, Clone)]
pub struct PreprocessTarget<'a> {
    pub settings: &'a DiagramsConfig,
    /// Directory receiving the rendered images.
    pub output_dir: &'a Path,
}

/// Preprocess `root` with the renderer described by `settings`.
pub fn preprocess(
    root: &Path,
    output_dir: &Path,
    settings: &DiagramsConfig,
    events: Option<Sender<DiagramEvent>>,
) -> Result<PreprocessSummary, DiagramError> {
    let renderer = CliRenderer::from_config(&settings.renderer);
    let namer = DiagramNamer::new(settings.format.as_str());
    let target = PreprocessTarget {
        settings,
        output_dir,
    };
    preprocess_with_renderer(root, &target, &renderer, &namer, events)
}

/// Preprocess `root` with an explicit renderer and namer.
pub fn preprocess_with_renderer(
    root: &Path,
    target: &PreprocessTarget<'_>,
    renderer: &impl DiagramRenderer,
    namer: &DiagramNamer,
    events: Option<Sender<DiagramEvent>>,
) -> Result<PreprocessSummary, DiagramError> {
    fs::create_dir_all(target.output_dir).map_err(io_at(target.output_dir))?;

    // List first: rewrites drop temp files into the directories being walked
    let documents = find_documents(root, &target.settings.extension)?;
    tracing::info!(root = %root.display(), documents = documents.len(), "Preprocessing diagrams");

    let mut summary = PreprocessSummary::default();
    for path in &documents {
        let outcome = process_document(path, target, renderer, namer, events.as_ref())?;
        summary.documents += 1;
        summary.rendered += outcome.rendered;
        summary.failed += outcome.failed;
        if outcome.rewritten {
            summary.rewritten += 1;
        }
    }

    tracing::info!(
        documents = summary.documents,
        rewritten = summary.rewritten,
        rendered = summary.rendered,
        failed = summary.failed,
        "Diagram preprocessing complete"
    );
    Ok(summary)
}

/// Regular files under `root` whose extension matches, in walk order.
pub fn find_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>, DiagramError> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

/// What happened to a single document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub blocks: usize,
    pub rendered: usize,
    pub failed: usize,
    pub rewritten: bool,
}

/// Render the blocks of one document and rewrite it if anything rendered.
pub fn process_document(
    path: &Path,
    target: &PreprocessTarget<'_>,
    renderer: &impl DiagramRenderer,
    namer: &DiagramNamer,
    events: Option<&Sender<DiagramEvent>>,
) -> Result<DocumentOutcome, DiagramError> {
    let content = fs::read_to_string(path).map_err(io_at(path))?;
    let segments = scan(&content, &target.settings.language);
    let blocks = segments
        .iter()
        .filter(|s| matches!(s, Segment::Diagram(_)))
        .count();

    let mut outcome = DocumentOutcome {
        blocks,
        ..DocumentOutcome::default()
    };
    if blocks == 0 {
        tracing::debug!(path = %path.display(), "No diagram blocks");
        return Ok(outcome);
    }

    send(
        events,
        DiagramEvent::DocumentStarted {
            path: path.to_path_buf(),
            blocks,
        },
    );

    let mut lines: Vec<String> = Vec::with_capacity(segments.len() + blocks * 2);
    for segment in &segments {
        match segment {
            Segment::Line(line) => lines.push((*line).to_string()),
            Segment::Diagram(block) => {
                match render_block(block, target, renderer, namer) {
                    Ok(public_path) => {
                        outcome.rendered += 1;
                        lines.push(String::new());
                        lines.push(format!("![Diagram]({public_path})"));
                        lines.push(String::new());
                        send(
                            events,
                            DiagramEvent::DiagramRendered {
                                document: path.to_path_buf(),
                                line: block.start_line + 1,
                                public_path,
                            },
                        );
                    }
                    Err(e) => {
                        outcome.failed += 1;
                        tracing::warn!(
                            document = %path.display(),
                            line = block.start_line + 1,
                            error = %e,
                            "Diagram render failed, keeping source block"
                        );
                        lines.extend(block.original_lines().map(str::to_string));
                        send(
                            events,
                            DiagramEvent::DiagramFailed {
                                document: path.to_path_buf(),
                                line: block.start_line + 1,
                                reason: e.to_string(),
                            },
                        );
                    }
                }
            }
        }
    }

    if outcome.rendered > 0 {
        write_atomically(path, &lines.join("\n"))?;
        outcome.rewritten = true;
        send(
            events,
            DiagramEvent::DocumentRewritten {
                path: path.to_path_buf(),
                rendered: outcome.rendered,
            },
        );
    }
    Ok(outcome)
}

/// Render one block; on success returns the image's public path.
///
/// Any output left behind by a failed render is removed.
fn render_block(
    block: &DiagramBlock<'_>,
    target: &PreprocessTarget<'_>,
    renderer: &impl DiagramRenderer,
    namer: &DiagramNamer,
) -> Result<String, RenderError> {
    let file_name = namer.next_name();
    let output = target.output_dir.join(&file_name);

    if let Err(e) = renderer.render(&block.source(), &output) {
        match fs::remove_file(&output) {
            Ok(()) => tracing::debug!(path = %output.display(), "Removed partial output"),
            Err(rm) if rm.kind() == io::ErrorKind::NotFound => {}
            Err(rm) => {
                tracing::warn!(path = %output.display(), error = %rm, "Cannot remove partial output")
            }
        }
        return Err(e);
    }

    tracing::info!(file = %file_name, "Rendered diagram");
    Ok(public_url(&target.settings.public_path, &file_name))
}

/// `public_path` and `file_name` joined by exactly one slash.
pub fn public_url(public_path: &str, file_name: &str) -> String {
    format!("{}/{}", public_path.trim_end_matches('/'), file_name)
}

/// Replace `path` with `contents` via a sibling temp file and rename.
fn write_atomically(path: &Path, contents: &str) -> Result<(), DiagramError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_at(path))?;
    tmp.write_all(contents.as_bytes()).map_err(io_at(path))?;
    tmp.as_file().sync_all().map_err(io_at(path))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_at(path))?;
    }
    tmp.persist(path).map_err(|source| DiagramError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn send(events: Option<&Sender<DiagramEvent>>, event: DiagramEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening
        tx.send(event).ok();
    }
}
