//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user's file in the source directory is merged on top
//! key by key, so it only needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Vibe AI Infra"
//! tagline = "Nano-scale infrastructure for AI systems"
//! base_path = "/"                 # Prefix for every generated link
//! output = "static"               # Only static output is produced
//! repo_base = "https://github.com/lastweek/"
//! catalogue = "catalogue.toml"    # Catalogue file, relative to the source dir
//!
//! [diagrams]
//! source_dir = "content/til"      # Documents to preprocess
//! output_dir = "public/mermaid"   # Where rendered images are written
//! public_path = "/mermaid"        # URL prefix used in image references
//! extension = "md"
//! language = "mermaid"            # Opening fence is ```mermaid
//! format = "svg"
//!
//! [diagrams.renderer]
//! command = ["npx", "mmdc"]
//! background = "transparent"
//! scale = 2
//! timeout_secs = 60
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity and link layout.
    pub site: SiteSection,
    /// Diagram preprocessor settings.
    pub diagrams: DiagramsConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.site.base_path;
        if !base.starts_with('/') || !base.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_path must start and end with '/'".into(),
            ));
        }
        if self.site.catalogue.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.catalogue must not be empty".into(),
            ));
        }
        if self.diagrams.extension.is_empty() || self.diagrams.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "diagrams.extension must be a bare extension like \"md\"".into(),
            ));
        }
        if self.diagrams.language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.language must not be empty".into(),
            ));
        }
        if self.diagrams.format.trim().is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.format must not be empty".into(),
            ));
        }
        let renderer = &self.diagrams.renderer;
        if renderer.command.is_empty() || renderer.command[0].trim().is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.renderer.command must name a program".into(),
            ));
        }
        if renderer.scale == 0 {
            return Err(ConfigError::Validation(
                "diagrams.renderer.scale must be at least 1".into(),
            ));
        }
        if renderer.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.renderer.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// How the site is emitted. Only fully static output exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Static,
}

/// Site identity and link layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Page title and header heading.
    pub title: String,
    /// One-line subtitle under the heading.
    pub tagline: String,
    /// Prefix for every generated link, e.g. `"/"` or `"/infra/"`.
    pub base_path: String,
    pub output: OutputMode,
    /// URL that project `repo` names are appended to.
    pub repo_base: String,
    /// Catalogue file name, relative to the source directory.
    pub catalogue: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Vibe AI Infra".to_string(),
            tagline: "Nano-scale infrastructure for AI systems".to_string(),
            base_path: "/".to_string(),
            output: OutputMode::Static,
            repo_base: "https://github.com/lastweek/".to_string(),
            catalogue: "catalogue.toml".to_string(),
        }
    }
}

impl SiteSection {
    /// Join a site-relative path onto the base path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path.trim_start_matches('/'))
    }

    /// Full URL of a project repository.
    pub fn repo_url(&self, repo: &str) -> String {
        if self.repo_base.ends_with('/') {
            format!("{}{}", self.repo_base, repo)
        } else {
            format!("{}/{}", self.repo_base, repo)
        }
    }
}

/// Diagram preprocessor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramsConfig {
    /// Root of the documents to preprocess.
    pub source_dir: String,
    /// Directory receiving rendered images (created if absent).
    pub output_dir: String,
    /// URL prefix of `output_dir` on the published site.
    pub public_path: String,
    /// Extension of documents to scan, without the dot.
    pub extension: String,
    /// Fence info string that marks a diagram block.
    pub language: String,
    /// Extension of rendered images; the renderer infers the format from it.
    pub format: String,
    pub renderer: RendererConfig,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            source_dir: "content/til".to_string(),
            output_dir: "public/mermaid".to_string(),
            public_path: "/mermaid".to_string(),
            extension: "md".to_string(),
            language: "mermaid".to_string(),
            format: "svg".to_string(),
            renderer: RendererConfig::default(),
        }
    }
}

/// External renderer invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Program and leading arguments; input/output/background/scale flags are appended.
    pub command: Vec<String>,
    pub background: String,
    pub scale: u32,
    /// Seconds before a hung renderer is killed and the block kept as-is.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: vec!["npx".to_string(), "mmdc".to_string()],
            background: "transparent".to_string(),
            scale: 2,
            timeout_secs: 60,
        }
    }
}

impl RendererConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, falling back to
/// stock defaults when the file is absent.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# vibe-site configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Vibe AI Infra"
tagline = "Nano-scale infrastructure for AI systems"

# Prefix for every generated link. Must start and end with '/'.
base_path = "/"

# Output mode. Only "static" is supported.
output = "static"

# Project `repo` names are appended to this URL.
repo_base = "https://github.com/lastweek/"

# Catalogue file, relative to the source directory.
catalogue = "catalogue.toml"

# ---------------------------------------------------------------------------
# Diagram preprocessing (vibe-site diagrams)
# ---------------------------------------------------------------------------
[diagrams]
# Documents under this directory are scanned recursively.
source_dir = "content/til"

# Rendered images land here; created if missing.
output_dir = "public/mermaid"

# URL prefix written into image references: ![Diagram](/mermaid/<file>)
public_path = "/mermaid"

# Only files with this extension are scanned.
extension = "md"

# Blocks opened with ```mermaid and closed with ``` are rendered.
language = "mermaid"

# Extension of rendered images.
format = "svg"

[diagrams.renderer]
# Invoked as: <command...> -i <input> -o <output> -b <background> -s <scale>
command = ["npx", "mmdc"]
background = "transparent"
scale = 2

# A renderer still running after this many seconds is killed and the
# diagram block is left untouched.
timeout_secs = 60
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_site_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.site.base_path, "/");
        assert_eq!(config.site.output, OutputMode::Static);
        assert_eq!(config.site.catalogue, "catalogue.toml");
    }

    #[test]
    fn default_config_has_renderer_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.diagrams.renderer.command, vec!["npx", "mmdc"]);
        assert_eq!(config.diagrams.renderer.background, "transparent");
        assert_eq!(config.diagrams.renderer.scale, 2);
        assert_eq!(config.diagrams.renderer.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[diagrams.renderer]
scale = 3
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.diagrams.renderer.scale, 3);
        // Untouched siblings keep their defaults
        assert_eq!(config.diagrams.renderer.background, "transparent");
        assert_eq!(config.diagrams.public_path, "/mermaid");
        assert_eq!(config.site.title, "Vibe AI Infra");
    }

    #[test]
    fn url_joins_base_path() {
        let mut site = SiteSection::default();
        assert_eq!(site.url("projects/a.html"), "/projects/a.html");
        site.base_path = "/infra/".to_string();
        assert_eq!(site.url("/index.html"), "/infra/index.html");
    }

    #[test]
    fn repo_url_handles_missing_slash() {
        let mut site = SiteSection::default();
        assert_eq!(
            site.repo_url("nano-kvm"),
            "https://github.com/lastweek/nano-kvm"
        );
        site.repo_base = "https://git.example.com/me".to_string();
        assert_eq!(site.repo_url("x"), "https://git.example.com/me/x");
    }

    #[test]
    fn unknown_output_mode_rejected() {
        let toml = r#"
[site]
output = "server"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Vibe AI Infra");
        assert_eq!(config.diagrams.source_dir, "content/til");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
title = "Lab Notes"
base_path = "/lab/"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Lab Notes");
        assert_eq!(config.site.base_path, "/lab/");
        assert_eq!(config.site.tagline, "Nano-scale infrastructure for AI systems");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
base_path = "infra"
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[diagrams]
langauge = "mermaid"
"#,
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[diagrams.renderer]
scale = 2
background = "transparent"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[diagrams.renderer]
scale = 4
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let renderer = merged.get("diagrams").unwrap().get("renderer").unwrap();
        assert_eq!(renderer.get("scale").unwrap().as_integer(), Some(4));
        assert_eq!(
            renderer.get("background").unwrap().as_str(),
            Some("transparent")
        );
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str(r#"command = ["npx", "mmdc"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"command = ["mmdc"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("command").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_base_path_needs_slashes() {
        let mut config = SiteConfig::default();
        config.site.base_path = "/infra".to_string();
        assert!(config.validate().is_err());
        config.site.base_path = "infra/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_renderer_command_not_empty() {
        let mut config = SiteConfig::default();
        config.diagrams.renderer.command = vec![];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn validate_scale_and_timeout_non_zero() {
        let mut config = SiteConfig::default();
        config.diagrams.renderer.scale = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.diagrams.renderer.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_extension_without_dot() {
        let mut config = SiteConfig::default();
        config.diagrams.extension = ".md".to_string();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.site.repo_base, defaults.site.repo_base);
        assert_eq!(config.diagrams.output_dir, defaults.diagrams.output_dir);
        assert_eq!(
            config.diagrams.renderer.command,
            defaults.diagrams.renderer.command
        );
        assert_eq!(
            config.diagrams.renderer.timeout_secs,
            defaults.diagrams.renderer.timeout_secs
        );
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.get("site").is_some());
        assert!(val.get("diagrams").unwrap().get("renderer").is_some());
    }
}
