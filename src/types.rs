//! Shared catalogue types.
//!
//! These are deserialized from the catalogue file, grouped by
//! [`catalogue`](crate::catalogue), rendered by [`generate`](crate::generate)
//! and serialized again into `catalogue.json` for downstream builders.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle tag attached to every project.
///
/// The declaration order is the display precedence: `Done` sorts first,
/// `Planned` last. The legacy spellings `TBD` and `WIP` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Done,
    #[serde(alias = "WIP")]
    InProgress,
    #[serde(alias = "TBD")]
    Planned,
}

impl Status {
    /// Sort rank within a category.
    pub fn rank(self) -> u8 {
        match self {
            Status::Done => 0,
            Status::InProgress => 1,
            Status::Planned => 2,
        }
    }

    /// Human label used in badges and the header stats.
    pub fn label(self) -> &'static str {
        match self {
            Status::Done => "Done",
            Status::InProgress => "In Progress",
            Status::Planned => "Planned",
        }
    }

    /// Suffix for the `status-*` CSS class.
    pub fn css_class(self) -> &'static str {
        match self {
            Status::Done => "done",
            Status::InProgress => "in-progress",
            Status::Planned => "planned",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Unique identifier, also the detail page slug.
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: Status,
    /// Repository name, joined onto `site.repo_base` when rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    /// Longer introduction shown only in the detail overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Design notes shown after the introduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

/// Projects of one category, already sorted by status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub projects: Vec<&'a Project>,
}
