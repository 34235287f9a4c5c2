//! Data Store: the fetched events and the category set derived from them.
//!
//! Built once at startup and immutable afterwards. Sessions share it behind
//! an `Arc`; nothing here ever mutates after `load` returns.

use tracing::info;

use eventmap_common::{Category, CategoryId, Event, EventId, Result};

use crate::traits::EventFeed;

/// Anything with a stable identifier that dedupe and lookups key on.
pub trait Identified {
    type Id: PartialEq;

    fn id(&self) -> &Self::Id;
}

impl Identified for Event {
    type Id = EventId;

    fn id(&self) -> &EventId {
        &self.id
    }
}

impl Identified for Category {
    type Id = CategoryId;

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

/// Membership by identifier equality.
pub fn contains_by_id<T: Identified>(candidate: &T, collection: &[T]) -> bool {
    collection.iter().any(|item| item.id() == candidate.id())
}

/// Collect the categories of `events`, first occurrence wins.
pub fn unique_categories<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    for event in events {
        for category in &event.categories {
            if !contains_by_id(category, &categories) {
                categories.push(category.clone());
            }
        }
    }
    categories
}

#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
    categories: Vec<Category>,
}

impl EventStore {
    /// Fetch once from `feed` and build the store. No retry.
    pub async fn load(feed: &dyn EventFeed) -> Result<Self> {
        let events = feed.fetch_events().await?;
        let store = Self::from_events(events);
        info!(
            events = store.events.len(),
            categories = store.categories.len(),
            "Event store loaded"
        );
        Ok(store)
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        let categories = unique_categories(&events);
        Self { events, categories }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event_by_id(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn category_by_id(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{event_with, FailingFeed, StaticFeed};
    use eventmap_common::EventMapError;

    fn sample() -> Vec<Event> {
        vec![
            event_with("EONET_1", "Storm Alpha", &[("1", "Severe Storms")], (-90.0, 20.0)),
            event_with(
                "EONET_2",
                "Fire Beta",
                &[("2", "Wildfires"), ("1", "Severe Storms")],
                (-120.0, 38.0),
            ),
            event_with("EONET_3", "Fire Gamma", &[("2", "Wildfires")], (150.0, -33.0)),
        ]
    }

    #[tokio::test]
    async fn load_builds_events_and_deduped_categories() {
        let feed = StaticFeed::new(sample());
        let store = EventStore::load(&feed).await.unwrap();

        assert_eq!(store.len(), 3);
        let ids: Vec<&str> = store.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"], "one entry per id, first-seen order");
    }

    #[tokio::test]
    async fn load_surfaces_fetch_error() {
        let err = EventStore::load(&FailingFeed).await.unwrap_err();
        assert!(matches!(err, EventMapError::Fetch(_)));
    }

    #[test]
    fn event_by_id_finds_every_loaded_event() {
        let store = EventStore::from_events(sample());
        for event in store.events() {
            assert_eq!(store.event_by_id(&event.id), Some(event));
        }
        assert_eq!(store.event_by_id(&EventId::new("EONET_404")), None);
    }

    #[test]
    fn contains_by_id_ignores_other_fields() {
        let known = vec![Category {
            id: CategoryId::from(8),
            title: "Wildfires".to_string(),
        }];
        let renamed = Category {
            id: CategoryId::from(8),
            title: "Fires (renamed)".to_string(),
        };
        let other = Category {
            id: CategoryId::from(12),
            title: "Wildfires".to_string(),
        };
        assert!(contains_by_id(&renamed, &known));
        assert!(!contains_by_id(&other, &known));
        assert!(!contains_by_id(&other, &[]));
    }

    #[test]
    fn empty_store_has_no_categories() {
        let store = EventStore::from_events(vec![]);
        assert!(store.is_empty());
        assert!(store.categories().is_empty());
        assert_eq!(store.category_by_id(&CategoryId::from(1)), None);
    }
}
