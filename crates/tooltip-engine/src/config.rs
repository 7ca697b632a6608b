//! Loading and checking tooltip options

use std::fs;
use std::path::Path;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tooltip_shared::{TooltipError, TooltipOptions, TooltipResult};

use crate::template::is_valid_date_format;

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

/// Flot-style plot options: `{ "tooltip": true, "tooltipOpts": { ... } }`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlotOptions {
    #[serde(default, deserialize_with = "present")]
    tooltip: Option<TooltipSwitch>,
    #[serde(default)]
    tooltip_opts: Option<TooltipOptions>,
}

/// Value of the `tooltip` key. Only `false` or a missing key turn
/// tooltips off; `1`, `"yes"`, `null` or an object all enable them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TooltipSwitch {
    Flag(bool),
    Other(IgnoredAny),
}

impl TooltipSwitch {
    fn is_on(&self) -> bool {
        !matches!(self, TooltipSwitch::Flag(false))
    }
}

/// Keeps an explicit `null` distinct from a missing key
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TooltipSwitch>, D::Error> {
    TooltipSwitch::deserialize(deserializer).map(Some)
}

/// Configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a bare options block from a file
    pub fn parse_file(path: impl AsRef<Path>) -> TooltipResult<TooltipOptions> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| TooltipError::Parse {
            message: format!("Cannot read {}: {}", path.display(), e),
        })?;

        let format = Self::detect_format(path)?;
        Self::parse_string(&content, format)
    }

    /// Parse a bare options block
    pub fn parse_string(content: &str, format: ConfigFormat) -> TooltipResult<TooltipOptions> {
        Self::parse(content, format)
    }

    /// Parse plot options; `None` when the tooltip switch is missing or off
    pub fn parse_plot_options(content: &str, format: ConfigFormat) -> TooltipResult<Option<TooltipOptions>> {
        let plot: PlotOptions = Self::parse(content, format)?;

        match plot.tooltip {
            Some(switch) if switch.is_on() => Ok(Some(TooltipOptions {
                enabled: true,
                ..plot.tooltip_opts.unwrap_or_default()
            })),
            _ => Ok(None),
        }
    }

    /// Detect configuration format from file extension
    pub fn detect_format(path: &Path) -> TooltipResult<ConfigFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| TooltipError::Parse {
            message: "Cannot determine config format from file extension".to_string(),
        })?;

        match ext.to_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(TooltipError::Parse {
                message: format!("Unsupported config format: {ext}"),
            }),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(content: &str, format: ConfigFormat) -> TooltipResult<T> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(TooltipError::from),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| TooltipError::Parse {
                message: format!("TOML parse error: {e}"),
            }),
        }
    }
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(options: &TooltipOptions) -> TooltipResult<()> {
        Self::validate_sticky_class(&options.sticky_class_name)?;
        Self::validate_date_format("xDateFormat", options.x_date_format.as_deref())?;
        Self::validate_date_format("yDateFormat", options.y_date_format.as_deref())?;
        Self::validate_shifts(options)?;
        Ok(())
    }

    /// The sticky class is added with a single class-list call, so it must
    /// be exactly one class token
    fn validate_sticky_class(class: &str) -> TooltipResult<()> {
        if class.is_empty() {
            return Err(TooltipError::validation(
                "stickyClassName",
                "Sticky class name cannot be empty",
            ));
        }

        if class.chars().any(char::is_whitespace) {
            return Err(TooltipError::validation(
                "stickyClassName",
                format!("Sticky class name must be a single class, got '{class}'"),
            ));
        }

        Ok(())
    }

    fn validate_date_format(field: &str, format: Option<&str>) -> TooltipResult<()> {
        match format {
            Some(format) if !is_valid_date_format(format) => Err(TooltipError::validation(
                field,
                format!("Invalid date format: '{format}'"),
            )),
            _ => Ok(()),
        }
    }

    fn validate_shifts(options: &TooltipOptions) -> TooltipResult<()> {
        if !options.shifts.x.is_finite() || !options.shifts.y.is_finite() {
            return Err(TooltipError::validation(
                "shifts",
                format!(
                    "Shifts must be finite, got ({}, {})",
                    options.shifts.x, options.shifts.y
                ),
            ));
        }
        Ok(())
    }
}
