use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Identifiers ---

/// Event identifier as issued by the events API (e.g. `EONET_4785`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Category identifier. Numeric ids from older API versions are kept in
/// their decimal string form so both versions compare the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for CategoryId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

// --- Geo Types ---

/// A position in GeoJSON axis order. Serializes as `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

/// A map camera target. Leaflet takes `[lat, lng]`, the reverse of GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LngLat> for LatLng {
    fn from(p: LngLat) -> Self {
        Self {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Point { coordinates: LngLat },
    Polygon { coordinates: Vec<Vec<LngLat>> },
}

impl Shape {
    /// The single position used for markers and camera moves: the point
    /// itself, or the first vertex of a polygon's outer ring.
    pub fn anchor(&self) -> Option<LngLat> {
        match self {
            Shape::Point { coordinates } => Some(*coordinates),
            Shape::Polygon { coordinates } => coordinates.first()?.first().copied(),
        }
    }
}

/// One dated observation of where an event is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Geometry {
    pub fn point(date: DateTime<Utc>, at: LngLat) -> Self {
        Self {
            date,
            shape: Shape::Point { coordinates: at },
        }
    }

    pub fn anchor(&self) -> Option<LngLat> {
        self.shape.anchor()
    }
}

// --- Records ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}

/// Opaque provenance reference; carried through, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub categories: Vec<Category>,
    pub sources: Vec<Source>,
    /// Chronological, as delivered by the API.
    pub geometries: Vec<Geometry>,
}

impl Event {
    pub fn primary_category(&self) -> Option<&Category> {
        self.categories.first()
    }

    pub fn first_geometry(&self) -> Option<&Geometry> {
        self.geometries.first()
    }

    pub fn last_geometry(&self) -> Option<&Geometry> {
        self.geometries.last()
    }

    /// Where the event is pinned on the map. `None` means it can't be.
    pub fn anchor(&self) -> Option<LngLat> {
        self.first_geometry()?.anchor()
    }

    pub fn has_category(&self, id: &CategoryId) -> bool {
        self.categories.iter().any(|c| &c.id == id)
    }

    /// Substring match against the title or any category title.
    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .categories
                .iter()
                .any(|c| c.title.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn storm() -> Event {
        Event {
            id: EventId::new("EONET_1"),
            title: "Storm Alpha".to_string(),
            description: None,
            link: "https://example.com/1".to_string(),
            categories: vec![
                Category {
                    id: CategoryId::from(10),
                    title: "Severe Storms".to_string(),
                },
                Category {
                    id: CategoryId::from(14),
                    title: "Floods".to_string(),
                },
            ],
            sources: vec![],
            geometries: vec![
                Geometry::point(
                    Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap(),
                    LngLat::new(-90.5, 19.0),
                ),
                Geometry::point(
                    Utc.with_ymd_and_hms(2020, 6, 3, 0, 0, 0).unwrap(),
                    LngLat::new(-92.0, 21.5),
                ),
            ],
        }
    }

    #[test]
    fn lnglat_serializes_in_geojson_order() {
        let json = serde_json::to_value(LngLat::new(12.5, -3.0)).unwrap();
        assert_eq!(json, serde_json::json!([12.5, -3.0]));
    }

    #[test]
    fn geometry_serializes_flat_with_type_tag() {
        let g = storm().geometries[0].clone();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], serde_json::json!([-90.5, 19.0]));
        assert_eq!(json["date"], "2020-06-01T00:00:00Z");

        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn polygon_anchor_is_first_outer_vertex() {
        let shape = Shape::Polygon {
            coordinates: vec![vec![LngLat::new(1.0, 2.0), LngLat::new(3.0, 4.0)]],
        };
        assert_eq!(shape.anchor(), Some(LngLat::new(1.0, 2.0)));

        let empty = Shape::Polygon {
            coordinates: vec![],
        };
        assert_eq!(empty.anchor(), None);
    }

    #[test]
    fn event_anchor_uses_first_geometry() {
        assert_eq!(storm().anchor(), Some(LngLat::new(-90.5, 19.0)));
        assert_eq!(
            storm().last_geometry().and_then(Geometry::anchor),
            Some(LngLat::new(-92.0, 21.5))
        );
    }

    #[test]
    fn search_matches_title_or_any_category() {
        let e = storm();
        assert!(e.matches_search("alpha"));
        assert!(e.matches_search("flood"));
        assert!(e.matches_search(""));
        assert!(!e.matches_search("volcano"));
    }

    #[test]
    fn category_membership_by_id() {
        let e = storm();
        assert!(e.has_category(&CategoryId::from(14)));
        assert!(!e.has_category(&CategoryId::from(8)));
    }
}
