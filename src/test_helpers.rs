//! Shared test utilities for the vibe-site test suite.
//!
//! Provides record builders, a fixture copier, and lookup helpers that panic
//! with the available names when something is missing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let catalogue = Catalogue::load(&tmp.path().join("catalogue.toml")).unwrap();
//! let groups = catalogue.groups();
//!
//! assert_eq!(group_ids(find_group(&groups, "Virt")), vec!["nano-kvm", "nano-container"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::catalogue::Catalogue;
use crate::types::{CategoryGroup, Project, Status};

// =========================================================================
// Record builders
// =========================================================================

/// A minimal project: name and description are derived from the id.
pub fn project(id: &str, category: &str, status: Status) -> Project {
    Project {
        id: id.to_string(),
        name: format!("{id} project"),
        category: category.to_string(),
        status,
        repo: None,
        description: format!("{id} description"),
        goals: Vec::new(),
        intro: None,
        architecture: None,
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a project by id. Panics if not found.
pub fn find_project<'a>(catalogue: &'a Catalogue, id: &str) -> &'a Project {
    catalogue.find(id).unwrap_or_else(|| {
        let ids: Vec<&str> = catalogue.projects.iter().map(|p| p.id.as_str()).collect();
        panic!("project '{id}' not found. Available: {ids:?}")
    })
}

/// Find a group by category name. Panics if not found.
pub fn find_group<'a, 'b>(groups: &'b [CategoryGroup<'a>], category: &str) -> &'b CategoryGroup<'a> {
    groups
        .iter()
        .find(|g| g.category == category)
        .unwrap_or_else(|| {
            let names = group_names(groups);
            panic!("group '{category}' not found. Available: {names:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Category names of the groups, in order.
pub fn group_names<'a>(groups: &[CategoryGroup<'a>]) -> Vec<&'a str> {
    groups.iter().map(|g| g.category).collect()
}

/// Project ids of a group, in order.
pub fn group_ids<'a>(group: &CategoryGroup<'a>) -> Vec<&'a str> {
    group.projects.iter().map(|p| p.id.as_str()).collect()
}
