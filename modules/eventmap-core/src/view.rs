//! View Synchronizer: keeps the list, the category button bar and the event
//! counter matching whatever visibility set the controller hands it.
//!
//! It never decides what is visible. It remembers what the surface is
//! currently showing and only forwards changes, so applying the same state
//! twice is observably a no-op.

use serde::Serialize;
use tracing::debug;

use eventmap_common::{Category, CategoryColor, CategoryId, Event, EventId};

// ---------------------------------------------------------------------------
// Presentation types
// ---------------------------------------------------------------------------

pub const BUTTON_DOM_PREFIX: &str = "filter-cat-";

/// A category filter button, or the "All" button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ButtonId {
    All,
    Category(CategoryId),
}

impl ButtonId {
    pub fn dom_id(&self) -> String {
        match self {
            ButtonId::All => format!("{BUTTON_DOM_PREFIX}all"),
            ButtonId::Category(id) => format!("{BUTTON_DOM_PREFIX}{id}"),
        }
    }

    /// Category id encoded in a `filter-cat-{id}` element id.
    pub fn category_from_dom_id(dom_id: &str) -> Option<CategoryId> {
        dom_id
            .strip_prefix(BUTTON_DOM_PREFIX)
            .filter(|rest| !rest.is_empty())
            .map(CategoryId::new)
    }
}

impl From<ButtonId> for String {
    fn from(id: ButtonId) -> Self {
        id.dom_id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: EventId,
    pub title: String,
    pub color: CategoryColor,
    pub badges: Vec<String>,
}

impl ListRow {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            color: event
                .primary_category()
                .map(|c| CategoryColor::for_title(&c.title))
                .unwrap_or_default(),
            badges: event.categories.iter().map(|c| c.title.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryButton {
    pub id: ButtonId,
    pub label: String,
    pub color: CategoryColor,
}

impl CategoryButton {
    pub fn all() -> Self {
        Self {
            id: ButtonId::All,
            label: "All".to_string(),
            color: CategoryColor::Indigo,
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            id: ButtonId::Category(category.id.clone()),
            label: category.title.clone(),
            color: CategoryColor::for_title(&category.title),
        }
    }
}

/// What the surface currently shows for one row or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementState {
    pub visible: bool,
    pub active: bool,
}

impl ElementState {
    const FRESH_ROW: Self = Self {
        visible: true,
        active: false,
    };
    const FRESH_BUTTON: Self = Self {
        visible: true,
        active: true,
    };
}

// ---------------------------------------------------------------------------
// ViewSurface: the DOM boundary
// ---------------------------------------------------------------------------

pub trait ViewSurface {
    /// Replace the list contents. New rows start visible and inactive.
    fn render_rows(&mut self, rows: &[ListRow]);
    /// Replace the button bar. New buttons start visible and active.
    fn render_buttons(&mut self, buttons: &[CategoryButton]);
    fn set_row_visible(&mut self, id: &EventId, visible: bool);
    fn set_row_active(&mut self, id: &EventId, active: bool);
    fn scroll_to_row(&mut self, id: &EventId);
    fn set_button_visible(&mut self, id: &ButtonId, visible: bool);
    /// Inactive buttons are rendered dimmed.
    fn set_button_active(&mut self, id: &ButtonId, active: bool);
    fn set_count(&mut self, count: usize);
    fn set_search_text(&mut self, text: &str);
}

// ---------------------------------------------------------------------------
// ViewSync
// ---------------------------------------------------------------------------

pub struct ViewSync<S: ViewSurface> {
    surface: S,
    rows: Vec<(EventId, ElementState)>,
    buttons: Vec<(ButtonId, ElementState)>,
    count: Option<usize>,
    search_text: String,
}

impl<S: ViewSurface> ViewSync<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            rows: Vec::new(),
            buttons: Vec::new(),
            count: None,
            search_text: String::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // --- Rendering ---

    pub fn populate_list(&mut self, events: &[Event]) {
        let rows: Vec<ListRow> = events.iter().map(ListRow::from_event).collect();
        self.surface.render_rows(&rows);
        self.rows = rows
            .into_iter()
            .map(|row| (row.id, ElementState::FRESH_ROW))
            .collect();
    }

    /// Render "All" followed by one button per category.
    pub fn populate_buttons(&mut self, categories: &[Category]) {
        let buttons: Vec<CategoryButton> = std::iter::once(CategoryButton::all())
            .chain(categories.iter().map(CategoryButton::from_category))
            .collect();
        self.surface.render_buttons(&buttons);
        self.buttons = buttons
            .into_iter()
            .map(|button| (button.id, ElementState::FRESH_BUTTON))
            .collect();
    }

    // --- Rows ---

    pub fn show_event(&mut self, id: &EventId) {
        self.set_row_visible(id, true);
    }

    pub fn hide_event(&mut self, id: &EventId) {
        self.set_row_visible(id, false);
    }

    fn set_row_visible(&mut self, id: &EventId, visible: bool) {
        let Some((_, state)) = self.rows.iter_mut().find(|(row, _)| row == id) else {
            debug!(event_id = %id, "Row not rendered, ignoring visibility change");
            return;
        };
        if state.visible != visible {
            state.visible = visible;
            self.surface.set_row_visible(id, visible);
        }
    }

    /// Mark one row active and every other row inactive, then scroll to it.
    pub fn set_active_event(&mut self, id: &EventId) {
        if !self.rows.iter().any(|(row, _)| row == id) {
            debug!(event_id = %id, "Row not rendered, ignoring selection");
            return;
        }
        for (row, state) in self.rows.iter_mut() {
            let active = row == id;
            if state.active != active {
                state.active = active;
                self.surface.set_row_active(row, active);
                if active {
                    self.surface.scroll_to_row(row);
                }
            }
        }
    }

    // --- Buttons ---

    pub fn show_button(&mut self, id: &ButtonId) {
        self.update_button(id, |s| s.visible = true);
    }

    pub fn hide_button(&mut self, id: &ButtonId) {
        self.update_button(id, |s| s.visible = false);
    }

    pub fn activate_button(&mut self, id: &ButtonId) {
        self.update_button(id, |s| s.active = true);
    }

    pub fn deactivate_button(&mut self, id: &ButtonId) {
        self.update_button(id, |s| s.active = false);
    }

    fn update_button(&mut self, id: &ButtonId, change: impl FnOnce(&mut ElementState)) {
        let Some((_, state)) = self.buttons.iter_mut().find(|(b, _)| b == id) else {
            debug!(button = %id.dom_id(), "Button not rendered, ignoring");
            return;
        };
        let before = *state;
        change(state);
        if state.visible != before.visible {
            self.surface.set_button_visible(id, state.visible);
        }
        if state.active != before.active {
            self.surface.set_button_active(id, state.active);
        }
    }

    // --- Counter and search field ---

    pub fn set_count(&mut self, count: usize) {
        if self.count != Some(count) {
            self.count = Some(count);
            self.surface.set_count(count);
        }
    }

    /// Note what the user typed. The input already shows it, so nothing is
    /// sent to the surface.
    pub fn record_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    pub fn clear_search(&mut self) {
        if !self.search_text.is_empty() {
            self.search_text.clear();
            self.surface.set_search_text("");
        }
    }

    // --- Queries ---

    pub fn row_state(&self, id: &EventId) -> Option<ElementState> {
        self.rows.iter().find(|(row, _)| row == id).map(|(_, s)| *s)
    }

    pub fn button_state(&self, id: &ButtonId) -> Option<ElementState> {
        self.buttons.iter().find(|(b, _)| b == id).map(|(_, s)| *s)
    }

    pub fn visible_events(&self) -> Vec<&EventId> {
        self.rows
            .iter()
            .filter(|(_, s)| s.visible)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn visible_buttons(&self) -> Vec<&ButtonId> {
        self.buttons
            .iter()
            .filter(|(_, s)| s.visible)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn active_buttons(&self) -> Vec<&ButtonId> {
        self.buttons
            .iter()
            .filter(|(_, s)| s.active)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn active_event(&self) -> Option<&EventId> {
        self.rows.iter().find(|(_, s)| s.active).map(|(id, _)| id)
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }
}
