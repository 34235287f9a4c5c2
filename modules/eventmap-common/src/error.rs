use thiserror::Error;

pub type Result<T> = std::result::Result<T, EventMapError>;

#[derive(Error, Debug)]
pub enum EventMapError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
