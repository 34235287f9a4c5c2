pub mod commands;
pub mod controller;
pub mod map;
pub mod popup;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod view;

pub use commands::{CommandLog, MapCommand, ViewCommand};
pub use controller::{ClickTarget, Controller, UiEvent};
pub use map::{Feature, MapAdapter, MapOptions, MapState, MapSurface, PopupOpened};
pub use store::EventStore;
pub use traits::{EonetFeed, EventFeed};
pub use view::{ButtonId, ViewSurface, ViewSync};
