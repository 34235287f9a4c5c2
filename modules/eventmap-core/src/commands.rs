//! Serializable presentation commands.
//!
//! `CommandLog` implements both surfaces by recording what it was asked to
//! do. The web server drains it after every interaction and ships the batch
//! to the browser, which applies it to the DOM and to Leaflet.

use serde::Serialize;

use eventmap_common::{EventId, LatLng};

use crate::map::{Feature, MapOptions, MapSurface, MarkerStyle, PopupHandle};
use crate::view::{ButtonId, CategoryButton, ListRow, ViewSurface};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ViewCommand {
    RenderRows { rows: Vec<ListRow> },
    RenderButtons { buttons: Vec<CategoryButton> },
    SetRowVisible { id: EventId, visible: bool },
    SetRowActive { id: EventId, active: bool },
    ScrollToRow { id: EventId },
    SetButtonVisible { button: ButtonId, visible: bool },
    SetButtonActive { button: ButtonId, active: bool },
    SetCount { count: usize },
    SetSearchText { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MapCommand {
    Build {
        options: MapOptions,
    },
    AddMarker {
        popup: PopupHandle,
        feature: Feature,
        style: MarkerStyle,
    },
    ClearMarkers,
    FlyTo {
        target: LatLng,
        zoom: u8,
    },
    OpenPopup {
        popup: PopupHandle,
    },
}

#[derive(Debug)]
pub struct CommandLog<C> {
    commands: Vec<C>,
    next_popup: u64,
}

impl<C> Default for CommandLog<C> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            next_popup: 0,
        }
    }
}

impl<C> CommandLog<C> {
    pub fn commands(&self) -> &[C] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take everything recorded since the last drain.
    pub fn drain(&mut self) -> Vec<C> {
        std::mem::take(&mut self.commands)
    }
}

impl ViewSurface for CommandLog<ViewCommand> {
    fn render_rows(&mut self, rows: &[ListRow]) {
        self.commands.push(ViewCommand::RenderRows {
            rows: rows.to_vec(),
        });
    }

    fn render_buttons(&mut self, buttons: &[CategoryButton]) {
        self.commands.push(ViewCommand::RenderButtons {
            buttons: buttons.to_vec(),
        });
    }

    fn set_row_visible(&mut self, id: &EventId, visible: bool) {
        self.commands.push(ViewCommand::SetRowVisible {
            id: id.clone(),
            visible,
        });
    }

    fn set_row_active(&mut self, id: &EventId, active: bool) {
        self.commands.push(ViewCommand::SetRowActive {
            id: id.clone(),
            active,
        });
    }

    fn scroll_to_row(&mut self, id: &EventId) {
        self.commands.push(ViewCommand::ScrollToRow { id: id.clone() });
    }

    fn set_button_visible(&mut self, id: &ButtonId, visible: bool) {
        self.commands.push(ViewCommand::SetButtonVisible {
            button: id.clone(),
            visible,
        });
    }

    fn set_button_active(&mut self, id: &ButtonId, active: bool) {
        self.commands.push(ViewCommand::SetButtonActive {
            button: id.clone(),
            active,
        });
    }

    fn set_count(&mut self, count: usize) {
        self.commands.push(ViewCommand::SetCount { count });
    }

    fn set_search_text(&mut self, text: &str) {
        self.commands.push(ViewCommand::SetSearchText {
            text: text.to_string(),
        });
    }
}

impl MapSurface for CommandLog<MapCommand> {
    fn build(&mut self, options: &MapOptions) {
        self.commands.push(MapCommand::Build {
            options: options.clone(),
        });
    }

    fn add_marker(&mut self, feature: &Feature, style: &MarkerStyle) -> PopupHandle {
        let popup = PopupHandle(self.next_popup);
        self.next_popup += 1;
        self.commands.push(MapCommand::AddMarker {
            popup,
            feature: feature.clone(),
            style: style.clone(),
        });
        popup
    }

    fn clear_markers(&mut self) {
        self.commands.push(MapCommand::ClearMarkers);
    }

    fn fly_to(&mut self, target: LatLng, zoom: u8) {
        self.commands.push(MapCommand::FlyTo { target, zoom });
    }

    fn open_popup(&mut self, popup: PopupHandle) {
        self.commands.push(MapCommand::OpenPopup { popup });
    }
}
