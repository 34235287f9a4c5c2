// Test fixtures for the viewer core.
//
// - StaticFeed / FailingFeed (EventFeed): canned or failing fetch
// - event_with: a one-point event with the given categories
// - storm_and_fire: the two-event store used across scenario tests
// - recording_controller: a populated Controller over CommandLog surfaces

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use eventmap_common::{
    Category, CategoryId, Event, EventId, EventMapError, Geometry, LngLat, Result,
};

use crate::commands::{CommandLog, MapCommand, ViewCommand};
use crate::controller::Controller;
use crate::map::MapOptions;
use crate::store::EventStore;
use crate::traits::EventFeed;

pub type RecordingController = Controller<CommandLog<ViewCommand>, CommandLog<MapCommand>>;

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

pub struct StaticFeed {
    events: Vec<Event>,
}

impl StaticFeed {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventFeed for StaticFeed {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }
}

/// Always fails, like an unreachable events API.
pub struct FailingFeed;

#[async_trait]
impl EventFeed for FailingFeed {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        Err(EventMapError::Fetch("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// One event observed once at `(lng, lat)` on 2020-06-01.
pub fn event_with(id: &str, title: &str, categories: &[(&str, &str)], at: (f64, f64)) -> Event {
    Event {
        id: EventId::new(id),
        title: title.to_string(),
        description: None,
        link: format!("https://eonet.sci.gsfc.nasa.gov/api/v2.1/events/{id}"),
        categories: categories
            .iter()
            .map(|(cid, ctitle)| Category {
                id: CategoryId::new(*cid),
                title: ctitle.to_string(),
            })
            .collect(),
        sources: Vec::new(),
        geometries: vec![Geometry::point(
            Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap(),
            LngLat::new(at.0, at.1),
        )],
    }
}

/// "Storm Alpha" in category 1 (Severe Storms), "Fire Beta" in 2 (Wildfires).
pub fn storm_and_fire() -> Vec<Event> {
    vec![
        event_with("1", "Storm Alpha", &[("1", "Severe Storms")], (-90.0, 25.0)),
        event_with("2", "Fire Beta", &[("2", "Wildfires")], (-120.0, 38.0)),
    ]
}

/// A populated controller with its initial commands drained.
pub fn recording_controller(events: Vec<Event>) -> RecordingController {
    let store = Arc::new(EventStore::from_events(events));
    let mut controller = Controller::new(
        store,
        CommandLog::default(),
        CommandLog::default(),
        MapOptions::default(),
    );
    controller.populate();
    controller.view_mut().surface_mut().drain();
    controller.map_mut().surface_mut().drain();
    controller
}
