//! Tooltip options block and the serializable form of a hit point

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use tsify::Tsify;

use crate::{DataPointRef, Shift};

/// Default content template
pub const DEFAULT_CONTENT: &str = "%s | X: %x | Y: %y";

/// Default CSS class added to a pinned tooltip
pub const DEFAULT_STICKY_CLASS: &str = "flotTipSticky";

/// Configuration block read from the host chart's options.
///
/// Field names follow the camelCase option names; the names used by the
/// flot tooltip plugin (`defaultTheme`, `stickyable`, `stickyClass`) are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase", default)]
pub struct TooltipOptions {
    pub enabled: bool,

    /// Content template; a callback template is supplied separately as a hook
    pub content: String,

    /// strftime-style format for time-mode x axes
    pub x_date_format: Option<String>,

    /// strftime-style format for time-mode y axes
    pub y_date_format: Option<String>,

    pub shifts: Shift,

    #[serde(alias = "defaultTheme")]
    pub use_default_theme: bool,

    #[serde(alias = "stickyable")]
    pub sticky_enabled: bool,

    #[serde(alias = "stickyClass")]
    pub sticky_class_name: String,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            content: DEFAULT_CONTENT.to_string(),
            x_date_format: None,
            y_date_format: None,
            shifts: Shift::default(),
            use_default_theme: true,
            sticky_enabled: false,
            sticky_class_name: DEFAULT_STICKY_CLASS.to_string(),
        }
    }
}

impl TooltipOptions {
    /// Default options with the plugin switched on
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_sticky(mut self, sticky_enabled: bool) -> Self {
        self.sticky_enabled = sticky_enabled;
        self
    }

    pub fn with_shifts(mut self, x: f64, y: f64) -> Self {
        self.shifts = Shift { x, y };
        self
    }

    pub fn with_date_formats(mut self, x: Option<&str>, y: Option<&str>) -> Self {
        self.x_date_format = x.map(str::to_string);
        self.y_date_format = y.map(str::to_string);
        self
    }
}

/// Axis scale mode as reported by the host chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "lowercase")]
pub enum AxisMode {
    #[default]
    Linear,
    Time,
}

/// Serializable hit-test result as it crosses the JavaScript boundary.
/// Tick formatters are host callbacks and are attached by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct HitPointDto {
    pub series_index: usize,
    pub data_index: usize,
    pub datapoint: [f64; 2],
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub x_axis_mode: AxisMode,
    #[serde(default)]
    pub y_axis_mode: AxisMode,
}

impl HitPointDto {
    pub fn point_ref(&self) -> DataPointRef {
        DataPointRef::new(self.series_index, self.data_index, self.datapoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plugin() {
        let options = TooltipOptions::default();
        assert!(!options.enabled);
        assert_eq!(options.content, "%s | X: %x | Y: %y");
        assert_eq!(options.shifts, Shift { x: 10.0, y: 20.0 });
        assert!(options.use_default_theme);
        assert!(!options.sticky_enabled);
        assert_eq!(options.sticky_class_name, "flotTipSticky");
    }

    #[test]
    fn test_partial_block_fills_defaults() {
        let json = r#"{ "enabled": true, "content": "%y.2", "stickyEnabled": true }"#;
        let options: TooltipOptions = serde_json::from_str(json).unwrap();

        assert!(options.enabled);
        assert_eq!(options.content, "%y.2");
        assert!(options.sticky_enabled);
        assert_eq!(options.sticky_class_name, DEFAULT_STICKY_CLASS);
        assert_eq!(options.shifts, Shift::default());
    }

    #[test]
    fn test_flot_option_names_accepted() {
        let json = r#"{
            "enabled": true,
            "stickyable": true,
            "stickyClass": "pinned",
            "defaultTheme": false,
            "xDateFormat": "%Y-%m-%d",
            "shifts": { "x": 4, "y": 8 }
        }"#;
        let options: TooltipOptions = serde_json::from_str(json).unwrap();

        assert!(options.sticky_enabled);
        assert_eq!(options.sticky_class_name, "pinned");
        assert!(!options.use_default_theme);
        assert_eq!(options.x_date_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(options.y_date_format, None);
        assert_eq!(options.shifts, Shift { x: 4.0, y: 8.0 });
    }

    #[test]
    fn test_hit_point_dto_defaults() {
        let json = r#"{ "seriesIndex": 1, "dataIndex": 4, "datapoint": [3.0, 9.5] }"#;
        let dto: HitPointDto = serde_json::from_str(json).unwrap();

        assert_eq!(dto.label, None);
        assert_eq!(dto.x_axis_mode, AxisMode::Linear);
        assert_eq!(dto.point_ref(), DataPointRef::new(0, 0, [3.0, 9.5]));
        assert_eq!(dto.point_ref().series_index, 1);
    }
}
