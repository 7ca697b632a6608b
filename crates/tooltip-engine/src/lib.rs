//! Tooltip engine for flot-style charts
//!
//! Shows a floating label next to the data point under the pointer and,
//! when sticky mode is on, pins one label in place on click. The engine is
//! backend agnostic: the chart is reached through [`ChartHost`] and the page
//! through [`TooltipSurface`], with an in-memory implementation of both in
//! [`headless`].

pub mod config;
pub mod controller;
pub mod deferred;
pub mod headless;
pub mod host;
pub mod overlay;
pub mod point;
pub mod position;
pub mod store;
pub mod template;

pub use config::{ConfigFormat, ConfigParser, ConfigValidator};
pub use controller::{ChartEvent, ClickHook, HoverHook, TooltipController, TooltipHooks};
pub use deferred::{DeferredQueue, DeferredTask};
pub use host::{ChartHost, TooltipNode, TooltipSurface};
pub use overlay::{OverlayRegistry, Release};
pub use point::{AxisInfo, HitPoint, SeriesInfo, TickFormatter};
pub use position::compute_position;
pub use store::{TooltipRecord, TooltipStore};
pub use template::{format_content, substitute, ContentFn, ContentTemplate, MAX_PRECISION};

// Re-export the shared types so hosts need a single dependency
pub use tooltip_shared::{
    AxisMode, DataPointRef, EventKind, HitPointDto, Position, Shift, Size, Slot, TooltipError,
    TooltipOptions, TooltipResult, TooltipTheme, Viewport, CONTAINER_ID, TOOLTIP_CLASS,
};
