//! Catalogue loading and grouping.
//!
//! The catalogue is a TOML file listing the ordered category names and the
//! project records:
//!
//! ```toml
//! categories = ["Silicon", "Virt"]
//!
//! [[projects]]
//! id = "nano-kvm"
//! name = "Nano KVM"
//! category = "Virt"
//! status = "InProgress"
//! description = "Nano VMM for KVM/HV APIs."
//! goals = ["Able to start VM using KVM/HV APIs"]
//! ```
//!
//! Everything past [`Catalogue::load`] is pure: grouping, table flattening and
//! status counts never touch the filesystem and never fail.
//!
//! ## Unlisted categories
//!
//! A project whose category is not in `categories` is left out of every
//! grouped view. [`Catalogue::unmatched`] lists them so `check` and `build`
//! can report them instead of losing them silently.

use crate::types::{CategoryGroup, Project, Status};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Duplicate project id: {0}")]
    DuplicateId(String),
    #[error("Invalid project id {0:?}: use only letters, digits, '-' and '_'")]
    InvalidId(String),
}

/// The full set of records plus the category display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalogue {
    pub categories: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Catalogue {
    /// Read and parse a catalogue file.
    ///
    /// Ids name the detail page files, so each must be a unique slug.
    pub fn load(path: &Path) -> Result<Self, CatalogueError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue: Catalogue =
            toml::from_str(&content).map_err(|source| CatalogueError::Toml {
                path: path.to_path_buf(),
                source,
            })?;
        catalogue.check_ids()?;
        Ok(catalogue)
    }

    fn check_ids(&self) -> Result<(), CatalogueError> {
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !is_slug(&project.id) {
                return Err(CatalogueError::InvalidId(project.id.clone()));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(CatalogueError::DuplicateId(project.id.clone()));
            }
        }
        Ok(())
    }

    /// Group projects by category in category-list order, sorted by status.
    pub fn groups(&self) -> Vec<CategoryGroup<'_>> {
        group_by_category(&self.projects, &self.categories)
    }

    /// Projects whose category does not appear in the category list.
    pub fn unmatched(&self) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| !self.categories.contains(&p.category))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::from_projects(&self.projects)
    }
}

/// Non-empty and made of `[A-Za-z0-9_-]` only.
fn is_slug(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// For each non-empty category (in `categories` order), the projects that
/// belong to it sorted by [`Status::rank`]. Ties keep input order.
pub fn group_by_category<'a>(
    projects: &'a [Project],
    categories: &'a [String],
) -> Vec<CategoryGroup<'a>> {
    categories
        .iter()
        .filter_map(|category| {
            let mut members: Vec<&Project> = projects
                .iter()
                .filter(|p| &p.category == category)
                .collect();
            if members.is_empty() {
                return None;
            }
            // sort_by_key is stable
            members.sort_by_key(|p| p.status.rank());
            Some(CategoryGroup {
                category: category.as_str(),
                projects: members,
            })
        })
        .collect()
}

/// One row of the flattened catalogue table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    pub category: &'a str,
    pub project: &'a Project,
    /// Set on the first row of each category: how many rows the category cell spans.
    pub category_span: Option<usize>,
}

/// Flatten grouped output into table rows with category cell spans.
pub fn table_rows<'a>(groups: &[CategoryGroup<'a>]) -> Vec<TableRow<'a>> {
    groups
        .iter()
        .flat_map(|group| {
            let span = group.projects.len();
            group
                .projects
                .iter()
                .enumerate()
                .map(move |(i, project)| TableRow {
                    category: group.category,
                    project: *project,
                    category_span: (i == 0).then_some(span),
                })
        })
        .collect()
}

/// Per-status totals shown in the page header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub planned: usize,
}

impl StatusCounts {
    pub fn from_projects(projects: &[Project]) -> Self {
        projects
            .iter()
            .fold(Self::default(), |mut counts, project| {
                counts.total += 1;
                match project.status {
                    Status::Done => counts.done += 1,
                    Status::InProgress => counts.in_progress += 1,
                    Status::Planned => counts.planned += 1,
                }
                counts
            })
    }
}
