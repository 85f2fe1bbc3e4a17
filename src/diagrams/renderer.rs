//! Diagram renderer trait and the external-command implementation.
//!
//! [`DiagramRenderer`] turns diagram source text into an image file. The
//! production implementation, [`CliRenderer`], shells out to a Mermaid CLI
//! compatible tool (`npx mmdc` by default):
//!
//! ```text
//! <command...> -i <tmp>.mmd -o <output> -b <background> -s <scale>
//! ```
//!
//! The source is written to a temporary file that is removed whether or not
//! the render succeeds. The child runs under a timeout and is killed and
//! reaped when it expires, or when waiting on it fails. Processes the child
//! started itself are left running. A run only counts as successful if the
//! tool exits zero *and* the output file exists afterwards.

use crate::config::RendererConfig;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to start renderer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Renderer failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Renderer timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("Renderer produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// Anything that can turn diagram source into an image at `output`.
pub trait DiagramRenderer: Sync {
    fn render(&self, source: &str, output: &Path) -> Result<(), RenderError>;
}

/// Runs an external diagram CLI once per diagram.
#[derive(Debug, Clone)]
pub struct CliRenderer {
    program: String,
    base_args: Vec<String>,
    background: String,
    scale: u32,
    timeout: Duration,
}

impl CliRenderer {
    pub fn from_config(config: &RendererConfig) -> Self {
        let (program, base_args) = match config.command.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self {
            program,
            base_args,
            background: config.background.clone(),
            scale: config.scale,
            timeout: config.timeout(),
        }
    }

    /// Full argument list for one render, excluding the program itself.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-b".to_string(),
            self.background.clone(),
            "-s".to_string(),
            self.scale.to_string(),
        ]);
        args
    }
}

impl DiagramRenderer for CliRenderer {
    fn render(&self, source: &str, output: &Path) -> Result<(), RenderError> {
        let mut input = tempfile::Builder::new()
            .prefix("diagram-")
            .suffix(".mmd")
            .tempfile()?;
        input.write_all(source.as_bytes())?;
        input.flush()?;

        // stderr goes to a file so a chatty tool can never block on a full pipe
        let mut stderr_log = tempfile::tempfile()?;

        tracing::debug!(program = %self.program, input = %input.path().display(), output = %output.display(), "Spawning renderer");
        let mut child = Command::new(&self.program)
            .args(self.args(input.path(), output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_log.try_clone()?))
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let waited = match child.wait_timeout(self.timeout) {
            Ok(waited) => waited,
            Err(e) => {
                reap(&mut child);
                return Err(e.into());
            }
        };

        match waited {
            Some(status) if status.success() => {}
            Some(status) => {
                return Err(RenderError::Failed {
                    status: status.to_string(),
                    stderr: read_log(&mut stderr_log),
                });
            }
            None => {
                reap(&mut child);
                return Err(RenderError::TimedOut(self.timeout));
            }
        }

        if !output.is_file() {
            return Err(RenderError::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }
}

/// Kill `child` and wait for it so no zombie is left behind.
///
/// Only the direct child is signalled. Processes it started on its own
/// (`npx` launching `mmdc`, which launches a headless browser) are not
/// killed and may outlive it.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!(error = %e, "Failed to kill renderer");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "Failed to reap renderer");
    }
}

/// Last few lines of the captured stderr, trimmed for display.
fn read_log(log: &mut File) -> String {
    let mut text = String::new();
    if log.seek(SeekFrom::Start(0)).is_err() || log.read_to_string(&mut text).is_err() {
        return String::new();
    }
    let lines: Vec<&str> = text.trim().lines().collect();
    let tail = lines.len().saturating_sub(5);
    lines[tail..].join("\n")
}
