use thiserror::Error;

pub type Result<T> = std::result::Result<T, EonetError>;

#[derive(Debug, Error)]
pub enum EonetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for EonetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EonetError::Parse(err.to_string())
        } else {
            EonetError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EonetError {
    fn from(err: serde_json::Error) -> Self {
        EonetError::Parse(err.to_string())
    }
}
