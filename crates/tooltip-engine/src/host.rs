//! Seams to the host chart and to the rendering surface
//!
//! The host chart owns hit testing, highlighting and event delivery; the
//! surface owns the page the tooltip nodes live in. Both are external
//! collaborators, so the engine only talks to them through these traits.

use tooltip_shared::{EventKind, Position, Size, TooltipOptions, TooltipTheme, Viewport};

/// The chart a tooltip controller is attached to
pub trait ChartHost {
    /// Current tooltip configuration block; `None` when the chart has none
    fn tooltip_options(&self) -> Option<TooltipOptions>;

    fn subscribe(&self, kind: EventKind);

    fn unsubscribe(&self, kind: EventKind);

    /// Draw the chart's highlight marker on a data point
    fn highlight(&self, series_index: usize, data_index: usize);

    fn unhighlight(&self, series_index: usize, data_index: usize);
}

/// Page-level rendering backend holding the shared overlay container
pub trait TooltipSurface {
    type Node: TooltipNode;

    /// Create the container with this id if the page does not have it yet
    fn ensure_container(&mut self, container_id: &str);

    fn remove_container(&mut self, container_id: &str);

    /// Create an absolutely positioned node inside the container; the store
    /// hides it before first use. Returns `None` when the backend could not
    /// build the element.
    fn create_node(
        &mut self,
        container_id: &str,
        node_id: &str,
        theme: Option<&TooltipTheme>,
    ) -> Option<Self::Node>;

    fn viewport(&self) -> Viewport;
}

/// A single rendered tooltip element
pub trait TooltipNode {
    /// Replace the node's markup
    fn set_content(&mut self, html: &str);

    fn move_to(&mut self, position: Position);

    fn show(&mut self);

    fn hide(&mut self);

    fn add_class(&mut self, class: &str);

    fn remove_class(&mut self, class: &str);

    /// Rendered size including padding and border
    fn outer_size(&self) -> Size;

    /// Remove the node from its container
    fn detach(&mut self);
}
