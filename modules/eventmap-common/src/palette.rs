use serde::{Deserialize, Serialize};

/// Color assigned to a category. Drives the list row stripe, the filter
/// button and the marker fill. Unknown categories fall back to indigo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColor {
    Pink,
    Red,
    Cyan,
    Orange,
    #[default]
    Indigo,
}

impl CategoryColor {
    pub fn for_title(title: &str) -> Self {
        match title.to_lowercase().as_str() {
            "severe storms" => CategoryColor::Pink,
            "wildfires" => CategoryColor::Red,
            "sea and lake ice" => CategoryColor::Cyan,
            "volcanoes" => CategoryColor::Orange,
            _ => CategoryColor::Indigo,
        }
    }

    /// CSS class understood by the page stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            CategoryColor::Pink => "pink",
            CategoryColor::Red => "red",
            CategoryColor::Cyan => "cyan",
            CategoryColor::Orange => "orange",
            CategoryColor::Indigo => "indigo",
        }
    }

    pub fn fill_hex(&self) -> &'static str {
        match self {
            CategoryColor::Pink => "#e91e63",
            CategoryColor::Red => "#f44336",
            CategoryColor::Cyan => "#00bcd4",
            CategoryColor::Orange => "#ff9800",
            CategoryColor::Indigo => "#3f51b5",
        }
    }
}
