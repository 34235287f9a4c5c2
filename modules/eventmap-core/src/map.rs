//! Map Adapter: projects events onto map features, owns the marker popups,
//! and moves the camera.
//!
//! Two states, `Uninitialized` and `Ready`. Everything except `init` is a
//! logged no-op until the map has been built.

use serde::{Deserialize, Serialize};
use tracing::debug;

use eventmap_common::{CategoryColor, Config, Event, EventId, Geometry, LatLng};

use crate::popup::popup_html;
use crate::view::{ViewSurface, ViewSync};

// ---------------------------------------------------------------------------
// Map configuration
// ---------------------------------------------------------------------------

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;
const MAPBOX_ATTRIBUTION: &str = r#"Map data &copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors, Imagery &copy; <a href="https://www.mapbox.com/">Mapbox</a>"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub tile_size: u32,
    pub zoom_offset: i8,
    /// Zoom level used when flying to a selected event.
    pub focus_zoom: u8,
}

impl MapOptions {
    pub fn openstreetmap() -> Self {
        Self {
            tile_url: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
            max_zoom: 18,
            min_zoom: 2,
            tile_size: 256,
            zoom_offset: 0,
            focus_zoom: 3,
        }
    }

    pub fn mapbox(access_token: &str) -> Self {
        Self {
            tile_url: format!(
                "https://api.mapbox.com/styles/v1/mapbox/streets-v11/tiles/{{z}}/{{x}}/{{y}}?access_token={access_token}"
            ),
            attribution: MAPBOX_ATTRIBUTION.to_string(),
            tile_size: 512,
            zoom_offset: -1,
            ..Self::openstreetmap()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.mapbox_access_token {
            Some(token) => Self::mapbox(token),
            None => Self::openstreetmap(),
        }
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

/// Circle marker look, in Leaflet's option names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: String,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn for_category(title: &str) -> Self {
        Self {
            radius: 8.0,
            fill_color: CategoryColor::for_title(title).fill_hex().to_string(),
            color: "transparent".to_string(),
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

// ---------------------------------------------------------------------------
// Features and popups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    pub id: EventId,
    pub name: String,
    /// Title of the event's primary category.
    pub category: String,
    #[serde(default)]
    pub popup_content: String,
}

/// GeoJSON-shaped projection of one event. Only the first geometry is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

impl Feature {
    /// `None` for events with nothing to pin on the map.
    pub fn from_event(event: &Event) -> Option<Self> {
        let geometry = event.first_geometry()?.clone();
        geometry.anchor()?;
        Some(Self {
            kind: "Feature".to_string(),
            properties: FeatureProperties {
                id: event.id.clone(),
                name: event.title.clone(),
                category: event
                    .primary_category()
                    .map(|c| c.title.clone())
                    .unwrap_or_default(),
                popup_content: popup_html(event),
            },
            geometry,
        })
    }
}

pub fn build_features<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<Feature> {
    events.into_iter().filter_map(Feature::from_event).collect()
}

pub fn feature_collection(features: &[Feature]) -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Opaque reference to a popup living in the map library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopupHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub event_id: EventId,
    pub handle: PopupHandle,
}

/// Inbound notice from the map library that a popup opened, by any trigger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopupOpened {
    pub properties: FeatureProperties,
    pub geometry: Geometry,
}

// ---------------------------------------------------------------------------
// MapSurface: the map library boundary
// ---------------------------------------------------------------------------

pub trait MapSurface {
    /// Create the map, tile layer and an empty marker layer, fitted to the world.
    fn build(&mut self, options: &MapOptions);
    /// Add a circle marker with a bound popup and return the popup's handle.
    fn add_marker(&mut self, feature: &Feature, style: &MarkerStyle) -> PopupHandle;
    fn clear_markers(&mut self);
    fn fly_to(&mut self, target: LatLng, zoom: u8);
    fn open_popup(&mut self, popup: PopupHandle);
}

// ---------------------------------------------------------------------------
// MapAdapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Uninitialized,
    Ready,
}

pub struct MapAdapter<S: MapSurface> {
    surface: S,
    options: MapOptions,
    state: MapState,
    features: Vec<Feature>,
    popups: Vec<Popup>,
}

impl<S: MapSurface> MapAdapter<S> {
    pub fn new(surface: S, options: MapOptions) -> Self {
        Self {
            surface,
            options,
            state: MapState::Uninitialized,
            features: Vec::new(),
            popups: Vec::new(),
        }
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == MapState::Ready
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    pub fn popup_for(&self, id: &EventId) -> Option<PopupHandle> {
        self.popups
            .iter()
            .find(|p| &p.event_id == id)
            .map(|p| p.handle)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Build the map and render markers for `events`. Runs once.
    pub fn init<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        if self.is_ready() {
            debug!("Map already initialized, ignoring init");
            return;
        }
        self.features = build_features(events);
        self.surface.build(&self.options);
        self.state = MapState::Ready;
        self.render_markers();
    }

    /// Replace the feature set. Markers are left alone until `reset_markers`.
    pub fn reset_features<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        if !self.ensure_ready("reset_features") {
            return;
        }
        self.features = build_features(events);
    }

    /// Drop every marker and popup, then render the current feature set.
    pub fn reset_markers(&mut self) {
        if !self.ensure_ready("reset_markers") {
            return;
        }
        self.surface.clear_markers();
        self.popups.clear();
        self.render_markers();
    }

    /// Fly to the event and open its popup if it is currently rendered.
    pub fn focus_event(&mut self, event: &Event) {
        if !self.ensure_ready("focus_event") {
            return;
        }
        match event.anchor() {
            Some(anchor) => self.surface.fly_to(anchor.into(), self.options.focus_zoom),
            None => debug!(event_id = %event.id, "Event has no geometry, not flying"),
        }
        match self.popup_for(&event.id) {
            Some(handle) => self.surface.open_popup(handle),
            None => debug!(event_id = %event.id, "No popup rendered for event"),
        }
    }

    /// Mirror a map-driven selection into the list and recenter on it.
    pub fn handle_popup_open<V: ViewSurface>(&mut self, opened: &PopupOpened, view: &mut ViewSync<V>) {
        if !self.ensure_ready("handle_popup_open") {
            return;
        }
        view.set_active_event(&opened.properties.id);
        if let Some(anchor) = opened.geometry.anchor() {
            self.surface.fly_to(anchor.into(), self.options.focus_zoom);
        }
    }

    fn render_markers(&mut self) {
        for feature in &self.features {
            let style = MarkerStyle::for_category(&feature.properties.category);
            let handle = self.surface.add_marker(feature, &style);
            self.popups.push(Popup {
                event_id: feature.properties.id.clone(),
                handle,
            });
        }
    }

    fn ensure_ready(&self, op: &str) -> bool {
        if !self.is_ready() {
            debug!(op, "Map not initialized, ignoring");
        }
        self.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandLog, MapCommand, ViewCommand};
    use crate::testing::event_with;
    use eventmap_common::LngLat;

    fn events() -> Vec<Event> {
        vec![
            event_with("EONET_1", "Storm Alpha", &[("1", "Severe Storms")], (-90.0, 20.0)),
            event_with("EONET_2", "Fire Beta", &[("2", "Wildfires")], (-120.0, 38.0)),
        ]
    }

    fn ready_adapter() -> MapAdapter<CommandLog<MapCommand>> {
        let mut map = MapAdapter::new(CommandLog::default(), MapOptions::default());
        map.init(&events());
        map.surface_mut().drain();
        map
    }

    #[test]
    fn feature_carries_first_geometry_and_popup() {
        let feature = Feature::from_event(&events()[0]).unwrap();
        assert_eq!(feature.kind, "Feature");
        assert_eq!(feature.properties.name, "Storm Alpha");
        assert_eq!(feature.properties.category, "Severe Storms");
        assert!(feature.properties.popup_content.contains("Storm Alpha"));
        assert_eq!(feature.geometry.anchor(), Some(LngLat::new(-90.0, 20.0)));

        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["properties"]["popupContent"], feature.properties.popup_content);
        assert_eq!(json["geometry"]["coordinates"], serde_json::json!([-90.0, 20.0]));
    }

    #[test]
    fn events_without_geometry_are_not_projected() {
        let mut bare = events()[0].clone();
        bare.geometries.clear();
        assert!(Feature::from_event(&bare).is_none());
        assert_eq!(build_features(&[bare, events()[1].clone()]).len(), 1);
    }

    #[test]
    fn operations_before_init_are_no_ops() {
        let mut map = MapAdapter::new(CommandLog::default(), MapOptions::default());
        map.reset_features(&events());
        map.reset_markers();
        map.focus_event(&events()[0]);

        assert_eq!(map.state(), MapState::Uninitialized);
        assert!(map.features().is_empty());
        assert!(map.surface().commands().is_empty());
    }

    #[test]
    fn init_builds_once() {
        let mut map = MapAdapter::new(CommandLog::default(), MapOptions::default());
        map.init(&events());
        map.init(&events());

        let builds = map
            .surface()
            .commands()
            .iter()
            .filter(|c| matches!(c, MapCommand::Build { .. }))
            .count();
        assert_eq!(builds, 1);
        assert_eq!(map.popups().len(), 2);
    }

    #[test]
    fn reset_features_does_not_touch_markers() {
        let mut map = ready_adapter();
        map.reset_features(&events()[..1]);

        assert_eq!(map.features().len(), 1);
        assert_eq!(map.popups().len(), 2, "popups follow markers, not features");
        assert!(map.surface_mut().drain().is_empty());
    }

    #[test]
    fn reset_markers_replaces_popups_atomically() {
        let mut map = ready_adapter();
        let old = map.popup_for(&EventId::new("EONET_2")).unwrap();

        map.reset_features(&events()[..1]);
        map.reset_markers();

        assert_eq!(map.popups().len(), 1);
        assert_eq!(map.popup_for(&EventId::new("EONET_2")), None);
        assert_ne!(map.popup_for(&EventId::new("EONET_1")), Some(old));

        let commands = map.surface_mut().drain();
        assert_eq!(commands[0], MapCommand::ClearMarkers);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn focus_flies_and_opens_popup() {
        let mut map = ready_adapter();
        let handle = map.popup_for(&EventId::new("EONET_2")).unwrap();
        map.focus_event(&events()[1]);

        assert_eq!(
            map.surface_mut().drain(),
            vec![
                MapCommand::FlyTo {
                    target: LatLng { lat: 38.0, lng: -120.0 },
                    zoom: 3
                },
                MapCommand::OpenPopup { popup: handle },
            ]
        );
    }

    #[test]
    fn focus_on_unrendered_event_only_flies() {
        let mut map = ready_adapter();
        map.reset_features(&events()[..1]);
        map.reset_markers();
        map.surface_mut().drain();

        map.focus_event(&events()[1]);
        let commands = map.surface_mut().drain();
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], MapCommand::FlyTo { .. }));
    }

    #[test]
    fn popup_open_marks_row_active_and_recenters() {
        let mut map = ready_adapter();
        let mut view = ViewSync::new(CommandLog::<ViewCommand>::default());
        view.populate_list(&events());

        let feature = map.features()[1].clone();
        map.handle_popup_open(
            &PopupOpened {
                properties: feature.properties,
                geometry: feature.geometry,
            },
            &mut view,
        );

        assert_eq!(view.active_event(), Some(&EventId::new("EONET_2")));
        assert!(matches!(
            map.surface_mut().drain().as_slice(),
            [MapCommand::FlyTo { zoom: 3, .. }]
        ));
    }

    #[test]
    fn mapbox_options_use_token_and_large_tiles() {
        let options = MapOptions::mapbox("pk.abc");
        assert!(options.tile_url.ends_with("access_token=pk.abc"));
        assert!(options.tile_url.contains("/tiles/{z}/{x}/{y}"));
        assert_eq!(options.tile_size, 512);
        assert_eq!(options.zoom_offset, -1);
        assert_eq!(options.max_zoom, 18);
        assert_eq!(options.min_zoom, 2);
    }

    #[test]
    fn marker_fill_follows_category_palette() {
        assert_eq!(MarkerStyle::for_category("Wildfires").fill_color, "#f44336");
        assert_eq!(MarkerStyle::for_category("Drought").fill_color, "#3f51b5");
    }
}
