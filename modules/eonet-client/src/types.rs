use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Identifier that EONET emits as a number in v2.1 and as a slug in v3.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Number(u64),
    Text(String),
}

impl fmt::Display for FlexibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexibleId::Number(n) => write!(f, "{n}"),
            FlexibleId::Text(s) => f.write_str(s),
        }
    }
}

/// Top-level document returned by `GET /events`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub title: Option<String>,
    pub events: Vec<EonetEvent>,
}

/// A single natural event as published by EONET.
#[derive(Debug, Clone, Deserialize)]
pub struct EonetEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub categories: Vec<EonetCategory>,
    #[serde(default)]
    pub sources: Vec<EonetSource>,
    /// v2.1 calls this `geometries`, v3 calls it `geometry`.
    #[serde(default, alias = "geometry")]
    pub geometries: Vec<EonetGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EonetCategory {
    pub id: FlexibleId,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EonetSource {
    pub id: String,
    #[serde(default)]
    pub url: String,
}

/// One dated observation of an event's position.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum EonetGeometry {
    Point {
        date: DateTime<Utc>,
        coordinates: [f64; 2],
    },
    Polygon {
        date: DateTime<Utc>,
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl EonetGeometry {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            EonetGeometry::Point { date, .. } | EonetGeometry::Polygon { date, .. } => *date,
        }
    }
}

// --- Query parameters ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Open,
    Closed,
    All,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Closed => "closed",
            EventStatus::All => "all",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(EventStatus::Open),
            "closed" => Some(EventStatus::Closed),
            "all" => Some(EventStatus::All),
            _ => None,
        }
    }
}

/// Optional filters for the events endpoint. The default asks for the
/// API's own defaults (open events, no limit).
#[derive(Debug, Clone, Default)]
pub struct EventsQuery {
    pub status: Option<EventStatus>,
    pub limit: Option<u32>,
    pub days: Option<u32>,
}

impl EventsQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(days) = self.days {
            pairs.push(("days", days.to_string()));
        }
        pairs
    }
}
