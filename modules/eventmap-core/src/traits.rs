// Trait abstraction for the Data Store's one external dependency.
//
// EventFeed hides where events come from. Production wraps EonetClient;
// tests use StaticFeed / FailingFeed from `testing`. No network in `cargo test`.

use async_trait::async_trait;

use eonet_client::{EonetClient, EonetEvent, EonetGeometry, EventsQuery};
use eventmap_common::{
    Category, CategoryId, Event, EventId, EventMapError, Geometry, LngLat, Result, Shape, Source,
};

// ---------------------------------------------------------------------------
// EventFeed
// ---------------------------------------------------------------------------

#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Fetch every event once. Network and parse failures map to
    /// `EventMapError::Fetch`.
    async fn fetch_events(&self) -> Result<Vec<Event>>;
}

// ---------------------------------------------------------------------------
// EonetFeed: production feed
// ---------------------------------------------------------------------------

pub struct EonetFeed {
    client: EonetClient,
    query: EventsQuery,
}

impl EonetFeed {
    pub fn new(client: EonetClient, query: EventsQuery) -> Self {
        Self { client, query }
    }
}

#[async_trait]
impl EventFeed for EonetFeed {
    async fn fetch_events(&self) -> Result<Vec<Event>> {
        let raw = self
            .client
            .fetch_events(&self.query)
            .await
            .map_err(|e| EventMapError::Fetch(e.to_string()))?;
        Ok(raw.into_iter().map(convert_event).collect())
    }
}

/// Map the API's wire shape onto the domain record.
pub fn convert_event(raw: EonetEvent) -> Event {
    Event {
        id: EventId::new(raw.id),
        title: raw.title,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        link: raw.link,
        categories: raw
            .categories
            .into_iter()
            .map(|c| Category {
                id: CategoryId::new(c.id.to_string()),
                title: c.title,
            })
            .collect(),
        sources: raw
            .sources
            .into_iter()
            .map(|s| Source { id: s.id, url: s.url })
            .collect(),
        geometries: raw.geometries.into_iter().map(convert_geometry).collect(),
    }
}

fn convert_geometry(raw: EonetGeometry) -> Geometry {
    let date = raw.date();
    let shape = match raw {
        EonetGeometry::Point { coordinates, .. } => Shape::Point {
            coordinates: LngLat::from(coordinates),
        },
        EonetGeometry::Polygon { coordinates, .. } => Shape::Polygon {
            coordinates: coordinates
                .into_iter()
                .map(|ring| ring.into_iter().map(LngLat::from).collect())
                .collect(),
        },
    };
    Geometry { date, shape }
}
