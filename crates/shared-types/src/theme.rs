//! Element naming and the built-in tooltip look

use serde::{Deserialize, Serialize};

/// Id of the overlay container shared by every chart on the page
pub const CONTAINER_ID: &str = "flotTips";

/// Class carried by every tooltip node
pub const TOOLTIP_CLASS: &str = "flotTip";

/// Inline style declarations applied to new tooltip nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipTheme {
    pub declarations: Vec<(String, String)>,
}

impl Default for TooltipTheme {
    fn default() -> Self {
        let declarations = [
            ("background", "#fff"),
            ("z-index", "100"),
            ("padding", "0.4em 0.6em"),
            ("border-radius", "0.5em"),
            ("font-size", "0.8em"),
            ("border", "1px solid #111"),
            ("display", "none"),
            ("white-space", "nowrap"),
        ];

        Self {
            declarations: declarations
                .iter()
                .map(|(property, value)| (property.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl TooltipTheme {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Render as a `style` attribute value
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
