//! Shared types for the chart tooltip plugin
//!
//! This crate contains the plain data passed between the tooltip engine,
//! the browser bridge and host applications: screen geometry, data point
//! identity, slot names, event kinds, the options block and the error type.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use tsify::Tsify;

pub mod errors;
pub mod events;
pub mod theme;
pub mod tooltip;

pub use errors::{TooltipError, TooltipResult};
pub use events::EventKind;
pub use theme::{TooltipTheme, CONTAINER_ID, TOOLTIP_CLASS};
pub use tooltip::{AxisMode, HitPointDto, TooltipOptions};

/// Point in page coordinates (pixels from the document origin)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outer size of a rendered tooltip node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Visible window area, in page coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl Viewport {
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            inner_width,
            inner_height,
        }
    }

    pub fn scrolled(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

/// Offset between the cursor and the tooltip's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct Shift {
    pub x: f64,
    pub y: f64,
}

impl Default for Shift {
    fn default() -> Self {
        Self { x: 10.0, y: 20.0 }
    }
}

/// The two tooltip roles a chart can hold at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Hover,
    Sticky,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Hover => "hover",
            Slot::Sticky => "sticky",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = TooltipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hover" | "hovertooltip" => Ok(Slot::Hover),
            "sticky" | "stickytooltip" => Ok(Slot::Sticky),
            other => Err(TooltipError::Validation {
                message: format!("Unknown tooltip slot: {other}"),
                field: Some("slot".to_string()),
            }),
        }
    }
}

/// Identifies a chart data point.
///
/// Equality compares the coordinate pair only, not the indices: two points
/// from different series that sit on the same coordinates are the same point
/// as far as pinning is concerned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct DataPointRef {
    pub series_index: usize,
    pub data_index: usize,
    pub datapoint: [f64; 2],
}

impl DataPointRef {
    pub fn new(series_index: usize, data_index: usize, datapoint: [f64; 2]) -> Self {
        Self {
            series_index,
            data_index,
            datapoint,
        }
    }

    pub fn x(&self) -> f64 {
        self.datapoint[0]
    }

    pub fn y(&self) -> f64 {
        self.datapoint[1]
    }
}

impl PartialEq for DataPointRef {
    fn eq(&self, other: &Self) -> bool {
        self.datapoint[0] == other.datapoint[0] && self.datapoint[1] == other.datapoint[1]
    }
}
