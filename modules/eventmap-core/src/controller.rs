//! Interaction Controller: turns UI events into a filtered subset and pushes
//! it through the View Synchronizer and the Map Adapter.
//!
//! Inbound events arrive as a typed enum. Click targets are resolved by
//! class and element id into a row or button first, then branched on.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use eventmap_common::{CategoryId, Event, EventId};

use crate::map::{MapAdapter, MapOptions, MapSurface, PopupOpened};
use crate::store::{contains_by_id, unique_categories, EventStore};
use crate::view::{ButtonId, ViewSurface, ViewSync};

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

pub const ROW_CLASS: &str = "collection-item";
pub const ROW_TEXT_CLASS: &str = "collection-item-text";
pub const BADGE_CLASS: &str = "badge";
pub const FILTER_BUTTON_CLASS: &str = "filter-btn";
pub const ALL_BUTTON_CLASS: &str = "all-btn";

/// The element a click landed on, as reported by the page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClickTarget {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl ClickTarget {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// A click on a row, its title text, or one of its badges.
    pub fn resolve_row(&self) -> Option<EventId> {
        let id = if self.has_class(ROW_CLASS) {
            Some(self.id.as_str())
        } else if self.has_class(ROW_TEXT_CLASS) || self.has_class(BADGE_CLASS) {
            self.parent_id.as_deref()
        } else {
            None
        }?;
        (!id.is_empty()).then(|| EventId::new(id))
    }

    /// A click on a category filter button or on "All".
    pub fn resolve_button(&self) -> Option<ButtonId> {
        if self.has_class(FILTER_BUTTON_CLASS) {
            ButtonId::category_from_dom_id(&self.id).map(ButtonId::Category)
        } else if self.has_class(ALL_BUTTON_CLASS) {
            Some(ButtonId::All)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiEvent {
    SearchSubmitted { query: String },
    SearchInput { value: String },
    CategoryClicked { target: ClickTarget },
    ListClicked { target: ClickTarget },
    PopupOpened(PopupOpened),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Controller<V: ViewSurface, M: MapSurface> {
    store: Arc<EventStore>,
    view: ViewSync<V>,
    map: MapAdapter<M>,
}

impl<V: ViewSurface, M: MapSurface> Controller<V, M> {
    /// Taking the loaded store is what orders population after the fetch.
    pub fn new(store: Arc<EventStore>, view: V, map: M, options: MapOptions) -> Self {
        Self {
            store,
            view: ViewSync::new(view),
            map: MapAdapter::new(map, options),
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn view(&self) -> &ViewSync<V> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewSync<V> {
        &mut self.view
    }

    pub fn map(&self) -> &MapAdapter<M> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapAdapter<M> {
        &mut self.map
    }

    /// First render: list, buttons, counter, map.
    pub fn populate(&mut self) {
        let store = Arc::clone(&self.store);
        self.view.populate_list(store.events());
        self.view.populate_buttons(store.categories());
        self.view.set_count(store.len());
        self.map.init(store.events());
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        match event {
            UiEvent::SearchSubmitted { query } => self.search(&query),
            UiEvent::SearchInput { value } => self.search_input(&value),
            UiEvent::CategoryClicked { target } => match target.resolve_button() {
                Some(ButtonId::All) => self.show_all(),
                Some(ButtonId::Category(id)) => self.filter_category(&id),
                None => debug!(target = %target.id, "Click outside filter buttons"),
            },
            UiEvent::ListClicked { target } => match target.resolve_row() {
                Some(id) => self.select_event(&id),
                None => debug!(target = %target.id, "Click outside list rows"),
            },
            UiEvent::PopupOpened(opened) => self.popup_opened(&opened),
        }
    }

    /// Show events whose title or any category title contains `query`,
    /// case-insensitively. Every row is explicitly shown or hidden.
    pub fn search(&mut self, query: &str) {
        let store = Arc::clone(&self.store);
        let needle = query.to_lowercase();
        self.view.record_search_text(query);

        let mut found: Vec<&Event> = Vec::new();
        for event in store.events() {
            if event.matches_search(&needle) {
                self.view.show_event(&event.id);
                found.push(event);
            } else {
                self.view.hide_event(&event.id);
            }
        }

        let found_categories = unique_categories(found.iter().copied());
        for category in store.categories() {
            let button = ButtonId::Category(category.id.clone());
            if contains_by_id(category, &found_categories) {
                self.view.show_button(&button);
            } else {
                self.view.hide_button(&button);
            }
        }

        self.rebuild_map(found.iter().copied());
        self.view.set_count(found.len());
        self.view.deactivate_button(&ButtonId::All);
        debug!(query, matches = found.len(), "Search applied");
    }

    /// Live input: only an emptied field does anything, and it resets.
    pub fn search_input(&mut self, value: &str) {
        self.view.record_search_text(value);
        if value.is_empty() {
            self.show_all();
        }
    }

    /// Show only events tagged with `id`; dim every other button.
    pub fn filter_category(&mut self, id: &CategoryId) {
        let store = Arc::clone(&self.store);
        if store.category_by_id(id).is_none() {
            debug!(category_id = %id, "Unknown category, ignoring filter");
            return;
        }

        for category in store.categories() {
            let button = ButtonId::Category(category.id.clone());
            if &category.id == id {
                self.view.activate_button(&button);
            } else {
                self.view.deactivate_button(&button);
            }
        }
        self.view.deactivate_button(&ButtonId::All);

        let mut shown: Vec<&Event> = Vec::new();
        for event in store.events() {
            if event.has_category(id) {
                self.view.show_event(&event.id);
                shown.push(event);
            } else {
                self.view.hide_event(&event.id);
            }
        }

        self.rebuild_map(shown.iter().copied());
        self.view.set_count(shown.len());
        debug!(category_id = %id, matches = shown.len(), "Category filter applied");
    }

    /// Clear every filter and the search field.
    pub fn show_all(&mut self) {
        let store = Arc::clone(&self.store);
        for category in store.categories() {
            let button = ButtonId::Category(category.id.clone());
            self.view.activate_button(&button);
            self.view.show_button(&button);
        }
        for event in store.events() {
            self.view.show_event(&event.id);
        }
        self.view.clear_search();
        self.view.activate_button(&ButtonId::All);
        self.rebuild_map(store.events());
        self.view.set_count(store.len());
    }

    /// List-driven selection: highlight the row and focus the map on it.
    pub fn select_event(&mut self, id: &EventId) {
        let store = Arc::clone(&self.store);
        let Some(event) = store.event_by_id(id) else {
            debug!(event_id = %id, "Unknown event, ignoring selection");
            return;
        };
        self.view.set_active_event(id);
        self.map.focus_event(event);
    }

    /// Map-driven selection, symmetric with `select_event`.
    pub fn popup_opened(&mut self, opened: &PopupOpened) {
        self.map.handle_popup_open(opened, &mut self.view);
    }

    fn rebuild_map<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        self.map.reset_features(events);
        self.map.reset_markers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, classes: &[&str], parent: Option<&str>) -> ClickTarget {
        ClickTarget {
            id: id.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            parent_id: parent.map(str::to_string),
        }
    }

    #[test]
    fn row_resolves_from_row_text_or_badge() {
        assert_eq!(
            target("EONET_1", &["collection-item", "red"], None).resolve_row(),
            Some(EventId::new("EONET_1"))
        );
        assert_eq!(
            target("", &["truncate", "collection-item-text"], Some("EONET_2")).resolve_row(),
            Some(EventId::new("EONET_2"))
        );
        assert_eq!(
            target("", &["badge"], Some("EONET_3")).resolve_row(),
            Some(EventId::new("EONET_3"))
        );
    }

    #[test]
    fn row_does_not_resolve_from_other_elements() {
        assert_eq!(target("eventsList", &["collection"], None).resolve_row(), None);
        assert_eq!(target("", &["badge"], None).resolve_row(), None);
        assert_eq!(target("", &["collection-item"], None).resolve_row(), None);
    }

    #[test]
    fn button_resolves_by_class() {
        assert_eq!(
            target("filter-cat-8", &["filter-btn", "btn", "red"], None).resolve_button(),
            Some(ButtonId::Category(CategoryId::from(8)))
        );
        assert_eq!(
            target("filter-cat-all", &["btn", "all-btn", "indigo"], None).resolve_button(),
            Some(ButtonId::All)
        );
        assert_eq!(target("", &["card-action"], None).resolve_button(), None);
        assert_eq!(target("bogus", &["filter-btn"], None).resolve_button(), None);
    }

    #[test]
    fn ui_events_deserialize_from_tagged_json() {
        let event: UiEvent =
            serde_json::from_str(r#"{"kind": "search_submitted", "query": "Storm"}"#).unwrap();
        assert_eq!(
            event,
            UiEvent::SearchSubmitted {
                query: "Storm".to_string()
            }
        );

        let event: UiEvent = serde_json::from_str(
            r#"{"kind": "list_clicked", "target": {"id": "", "classes": ["badge"], "parent_id": "EONET_1"}}"#,
        )
        .unwrap();
        assert!(matches!(event, UiEvent::ListClicked { ref target } if target.resolve_row().is_some()));

        let event: UiEvent = serde_json::from_str(
            r#"{
                "kind": "popup_opened",
                "properties": {"id": "EONET_1", "name": "Storm Alpha", "category": "Severe Storms"},
                "geometry": {"date": "2020-06-01T00:00:00Z", "type": "Point", "coordinates": [-90, 20]}
            }"#,
        )
        .unwrap();
        match event {
            UiEvent::PopupOpened(opened) => {
                assert_eq!(opened.properties.id, EventId::new("EONET_1"));
                assert_eq!(opened.properties.popup_content, "");
                assert_eq!(
                    opened.geometry.anchor(),
                    Some(eventmap_common::LngLat::new(-90.0, 20.0))
                );
            }
            other => panic!("expected popup_opened, got {other:?}"),
        }
    }
}
