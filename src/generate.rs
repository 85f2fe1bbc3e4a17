//! HTML site generation.
//!
//! Renders the catalogue into a static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): header stats, one card grid per category,
//!   and the flattened catalogue table with no project selected
//! - **Detail pages** (`/projects/{id}.html`): the same page with `{id}`
//!   selected and its detail overlay open
//! - **Catalogue data** (`/catalogue.json`): grouped records and status counts
//!   for other build steps
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── catalogue.json
//! └── projects/
//!     ├── nano-kvm.html
//!     └── ...
//! ```
//!
//! ## Selection Without JavaScript
//!
//! Each selection state is its own page (see [`crate::selection`]). A table row
//! links to the page of the state reached by toggling it, so clicking the
//! selected row goes back to the index and clicking any other row opens that
//! project. The overlay's close control always links to the index.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated catalogue text is auto-escaped.

use crate::catalogue::{Catalogue, StatusCounts, TableRow, table_rows};
use crate::config::{SiteConfig, SiteSection};
use crate::selection::Selection;
use crate::types::{CategoryGroup, Project};
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files written by [`generate`], site-relative, in write order.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub index: String,
    pub detail_pages: Vec<GeneratedPage>,
    pub data: String,
}

#[derive(Debug)]
pub struct GeneratedPage {
    pub title: String,
    pub path: String,
}

/// Shape of `catalogue.json`.
#[derive(Debug, Serialize)]
struct CatalogueExport<'a> {
    counts: StatusCounts,
    groups: &'a [CategoryGroup<'a>],
}

const CSS: &str = include_str!("../static/style.css");
const DATA_FILE: &str = "catalogue.json";

/// Render the whole site into `output_dir`.
///
/// Only grouped projects get detail pages; projects in unlisted categories are
/// not linked from anywhere and are skipped.
pub fn generate(
    catalogue: &Catalogue,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let groups = catalogue.groups();
    let rows = table_rows(&groups);
    let counts = catalogue.status_counts();
    let view = CatalogueView {
        site: &config.site,
        groups: &groups,
        rows: &rows,
        counts,
    };

    fs::create_dir_all(output_dir.join("projects"))?;

    let none = Selection::none();
    let index_path = none.page();
    fs::write(
        output_dir.join(&index_path),
        render_page(&view, &none, None).into_string(),
    )?;

    let mut detail_pages = Vec::new();
    for row in &rows {
        let selection = Selection::of(row.project.id.as_str());
        let path = selection.page();
        let html = render_page(&view, &selection, Some(row.project));
        fs::write(output_dir.join(&path), html.into_string())?;
        detail_pages.push(GeneratedPage {
            title: row.project.name.clone(),
            path,
        });
    }

    let export = CatalogueExport {
        counts,
        groups: &groups,
    };
    fs::write(
        output_dir.join(DATA_FILE),
        serde_json::to_string_pretty(&export)?,
    )?;

    Ok(GenerateReport {
        index: index_path,
        detail_pages,
        data: DATA_FILE.to_string(),
    })
}

/// Everything a page needs besides the selection.
struct CatalogueView<'a> {
    site: &'a SiteSection,
    groups: &'a [CategoryGroup<'a>],
    rows: &'a [TableRow<'a>],
    counts: StatusCounts,
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

/// Title, tagline and per-status totals.
fn site_header(site: &SiteSection, counts: StatusCounts) -> Markup {
    let stats = [
        (counts.total, "Total Projects", None),
        (counts.done, "Done", Some("done")),
        (counts.in_progress, "In Progress", Some("in-progress")),
        (counts.planned, "Planned", Some("planned")),
    ];
    html! {
        header.header {
            h1 { a href=(site.url("")) { (site.title) } }
            p { (site.tagline) }
            div.stats {
                @for (value, label, modifier) in stats {
                    @let class = match modifier {
                        Some(m) => format!("stat-value {m}"),
                        None => "stat-value".to_string(),
                    };
                    div.stat {
                        div class=(class) { (value) }
                        div.stat-label { (label) }
                    }
                }
            }
        }
    }
}

fn status_badge(project: &Project) -> Markup {
    html! {
        span class={ "status status-" (project.status.css_class()) } { (project.status.label()) }
    }
}

fn goals_list(project: &Project) -> Markup {
    html! {
        @if !project.goals.is_empty() {
            div.goals-section {
                div.goals-title { "Goals" }
                ul.goals-list {
                    @for goal in &project.goals {
                        li { (goal) }
                    }
                }
            }
        }
    }
}

/// One card per project, one section per category.
fn category_sections(site: &SiteSection, groups: &[CategoryGroup<'_>]) -> Markup {
    html! {
        @for group in groups {
            section.category {
                div.category-header {
                    h2.category-name { (group.category) }
                    span.category-count { (group.projects.len()) " projects" }
                }
                div.projects-grid {
                    @for project in &group.projects {
                        article.project-card id=(project.id) {
                            div.project-header {
                                h3.project-name { (project.name) }
                                @if let Some(repo) = &project.repo {
                                    a.project-link href=(site.repo_url(repo))
                                        target="_blank" rel="noopener noreferrer"
                                        aria-label="View repository" { "repo" }
                                }
                                (status_badge(project))
                            }
                            p.project-description { (project.description) }
                            (goals_list(project))
                        }
                    }
                }
            }
        }
    }
}

/// Category / project / description table; the category cell spans its group.
pub(crate) fn projects_table(
    site: &SiteSection,
    rows: &[TableRow<'_>],
    selection: &Selection,
) -> Markup {
    html! {
        div.table-wrapper {
            table.projects-table {
                thead {
                    tr {
                        th { "Category" }
                        th { "Project" }
                        th { "Description" }
                    }
                }
                tbody {
                    @for row in rows {
                        @let selected = selection.is_selected(&row.project.id);
                        @let href = site.url(&selection.toggled(&row.project.id).page());
                        @let row_class = if selected {
                            format!("category-{} selected", slug(row.category))
                        } else {
                            format!("category-{}", slug(row.category))
                        };
                        tr class=(row_class) {
                            @if let Some(span) = row.category_span {
                                td.category-cell rowspan=(span) {
                                    span.category-badge { (row.category) }
                                }
                            }
                            td.project-cell {
                                a.row-link href=(href) {
                                    span.project-name { (row.project.name) }
                                }
                                @if let Some(repo) = &row.project.repo {
                                    " "
                                    a.github-link href=(site.repo_url(repo))
                                        target="_blank" rel="noopener noreferrer" { "↗" }
                                }
                            }
                            td.description-cell {
                                a.row-link href=(href) {
                                    span.description-text { (row.project.description) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Overlay describing the selected project.
pub(crate) fn detail_panel(site: &SiteSection, project: &Project) -> Markup {
    let mut cleared = Selection::of(project.id.as_str());
    cleared.close();
    let close_href = site.url(&cleared.page());
    html! {
        div.modal-overlay {
            div.modal-content role="dialog" aria-labelledby="modal-title" {
                div.modal-header {
                    div {
                        h2 id="modal-title" { (project.name) }
                        span.modal-category data-category=(project.category) { (project.category) }
                        " "
                        (status_badge(project))
                    }
                    a.close-button href=(close_href) aria-label="Close" { "✕" }
                }
                div.modal-body {
                    p.modal-description { (project.description) }
                    @if let Some(intro) = &project.intro {
                        p.modal-intro { (intro) }
                    }
                    @if let Some(architecture) = &project.architecture {
                        div.modal-architecture {
                            h4 { "Architecture" }
                            p { (architecture) }
                        }
                    }
                    @if !project.goals.is_empty() {
                        div.modal-goals {
                            h4 { "Goals" }
                            ul {
                                @for goal in &project.goals {
                                    li { (goal) }
                                }
                            }
                        }
                    }
                    @if let Some(repo) = &project.repo {
                        a.modal-repo-link href=(site.repo_url(repo))
                            target="_blank" rel="noopener noreferrer" {
                            "View repository ↗"
                        }
                    }
                }
            }
        }
    }
}

/// Lowercased, dash-joined form of a category name for CSS classes.
fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// Page Renderer
// ============================================================================

fn render_page(view: &CatalogueView<'_>, selection: &Selection, detail: Option<&Project>) -> Markup {
    let title = match detail {
        Some(project) => format!("{} · {}", project.name, view.site.title),
        None => view.site.title.clone(),
    };

    let content = html! {
        div.container {
            (site_header(view.site, view.counts))
            main {
                (category_sections(view.site, view.groups))
                (projects_table(view.site, view.rows, selection))
            }
            footer.footer {
                p { "Tracking progress on next-generation AI infrastructure" }
            }
        }
        @if let Some(project) = detail {
            (detail_panel(view.site, project))
        }
    };

    base_document(&title, content)
}

// ============================================================================
// Tests
// ============================================================================
