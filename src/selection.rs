//! Single-slot project selection behind the detail overlay.
//!
//! Selecting the selected project clears the slot, selecting any other project
//! replaces it, and closing the overlay always clears it.
//!
//! The generated site is static, so each selection state is its own page:
//! [`Selection::page`] maps a state to the file that shows it, and every table
//! row links to the page of the state reached by toggling that row.

/// The currently selected project, by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    /// No project selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// `id` selected.
    pub fn of(id: impl Into<String>) -> Self {
        Self {
            current: Some(id.into()),
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected() == Some(id)
    }

    /// Toggle `id`: clears if it is already selected, otherwise selects it.
    pub fn toggle(&mut self, id: &str) {
        if self.is_selected(id) {
            self.current = None;
        } else {
            self.current = Some(id.to_string());
        }
    }

    /// The state [`toggle`](Self::toggle) would produce, leaving `self` untouched.
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(id);
        next
    }

    /// Close the detail overlay.
    pub fn close(&mut self) {
        self.current = None;
    }

    /// Site-relative page that renders this state.
    pub fn page(&self) -> String {
        match &self.current {
            Some(id) => project_page(id),
            None => "index.html".to_string(),
        }
    }
}

/// Site-relative path of a project's detail page.
pub fn project_page(id: &str) -> String {
    format!("projects/{id}.html")
}
