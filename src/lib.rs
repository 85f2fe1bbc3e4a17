//! # Vibe Site
//!
//! Build tooling for a small static site that tracks a catalogue of
//! infrastructure projects and publishes "today I learned" notes.
//!
//! Two independent jobs share this crate:
//!
//! ```text
//! diagrams   content/til/*.md  →  public/mermaid/*.svg + rewritten notes
//! build      catalogue.toml    →  dist/ (index, one page per project, JSON)
//! ```
//!
//! They share no runtime state. `diagrams` runs once before the static site
//! build so that the notes it rewrites only reference images; `build` renders
//! the catalogue.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Project records, statuses and category groups |
//! | [`catalogue`] | Catalogue file loading, grouping, sorting and table flattening |
//! | [`selection`] | Which project's detail overlay is open, and the page that state maps to |
//! | [`generate`] | Renders the catalogue to HTML with Maud, plus `catalogue.json` |
//! | [`diagrams`] | Finds fenced diagram blocks, renders them, rewrites documents |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## One Page Per Selection
//!
//! The catalogue table lets a visitor select a row to open that project's
//! details. Instead of shipping JavaScript, every selection state is a page:
//! `index.html` has nothing selected and `projects/<id>.html` has `<id>`
//! selected. Row links point at the page of the toggled state, so selecting
//! the open row closes it again.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), so malformed markup
//! is a build error and every interpolated catalogue string is escaped.
//!
//! ## Failed Diagrams Stay Readable
//!
//! A diagram that cannot be rendered keeps its fenced source in the document.
//! The published note then shows the diagram text instead of a broken image,
//! and the run carries on with the next block.

pub mod catalogue;
pub mod config;
pub mod diagrams;
pub mod generate;
pub mod output;
pub mod selection;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
