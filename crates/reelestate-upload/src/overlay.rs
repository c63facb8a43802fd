use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlaySize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayColor {
    #[default]
    White,
    Black,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Caption burned over the listing video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    pub size: OverlaySize,
    pub color: OverlayColor,
    pub position: OverlayPosition,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: OverlaySize::default(),
            color: OverlayColor::default(),
            position: OverlayPosition::default(),
        }
    }

    pub fn with_size(mut self, size: OverlaySize) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: OverlayColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_position(mut self, position: OverlayPosition) -> Self {
        self.position = position;
        self
    }
}
