pub mod types;
pub mod palette;
pub mod config;
pub mod error;

pub use types::*;
pub use palette::CategoryColor;
pub use config::Config;
pub use error::{EventMapError, Result};
