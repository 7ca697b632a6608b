//! Per-chart tooltip controller
//!
//! Receives the host chart's pointer, hover, click and shutdown events and
//! drives the store, the content formatter and the position calculator. The
//! rules between the two slots:
//!
//! - hovering the pinned point never shows a hover tooltip
//! - clicking a point pins the hover tooltip to it, replacing any older pin
//! - clicking the pinned point again turns it back into the hover tooltip
//! - clicking an empty area drops the pin
//!
//! Pointer moves only ever reposition the hover tooltip.

use std::rc::Rc;

use tooltip_shared::{
    DataPointRef, EventKind, Position, Slot, TooltipOptions, TooltipTheme, CONTAINER_ID,
};
use uuid::Uuid;

use crate::config::ConfigValidator;
use crate::deferred::{DeferredQueue, DeferredTask};
use crate::host::{ChartHost, TooltipNode, TooltipSurface};
use crate::overlay::OverlayRegistry;
use crate::point::HitPoint;
use crate::position::compute_position;
use crate::store::{TooltipRecord, TooltipStore};
use crate::template::{format_content, ContentFn, ContentTemplate};

/// Called after the hover tooltip was filled and shown
pub type HoverHook<N> = Box<dyn FnMut(&HitPoint, &N)>;

/// Called after a click changed the sticky tooltip; the flag tells whether
/// the tooltip is pinned now
pub type ClickHook<N> = Box<dyn FnMut(Option<&HitPoint>, Option<&N>, bool)>;

/// Runtime callbacks that cannot live in the serializable options block
pub struct TooltipHooks<N> {
    /// Replaces the `content` template string when set
    pub content: Option<ContentFn>,
    pub on_hover: Option<HoverHook<N>>,
    pub on_click: Option<ClickHook<N>>,
}

impl<N> Default for TooltipHooks<N> {
    fn default() -> Self {
        Self {
            content: None,
            on_hover: None,
            on_click: None,
        }
    }
}

impl<N> TooltipHooks<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(
        mut self,
        content: impl Fn(Option<&str>, f64, f64, &HitPoint, &dyn ChartHost) -> String + 'static,
    ) -> Self {
        self.content = Some(Rc::new(content));
        self
    }

    pub fn on_hover(mut self, hook: impl FnMut(&HitPoint, &N) + 'static) -> Self {
        self.on_hover = Some(Box::new(hook));
        self
    }

    pub fn on_click(mut self, hook: impl FnMut(Option<&HitPoint>, Option<&N>, bool) + 'static) -> Self {
        self.on_click = Some(Box::new(hook));
        self
    }
}

/// Event delivered by the host chart. Positions are page coordinates.
#[derive(Debug, Clone)]
pub enum ChartEvent {
    PointerMove { page: Position },
    Hover { page: Position, hit: Option<HitPoint> },
    Click { page: Position, hit: Option<HitPoint> },
    Shutdown,
}

impl ChartEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChartEvent::PointerMove { .. } => EventKind::PointerMove,
            ChartEvent::Hover { .. } => EventKind::Hover,
            ChartEvent::Click { .. } => EventKind::Click,
            ChartEvent::Shutdown => EventKind::Shutdown,
        }
    }
}

pub struct TooltipController<H: ChartHost, S: TooltipSurface> {
    id: Uuid,
    host: H,
    surface: S,
    /// `None` when tooltips are disabled for the chart
    options: Option<TooltipOptions>,
    template: ContentTemplate,
    hooks: TooltipHooks<S::Node>,
    store: TooltipStore<S>,
    subscriptions: Vec<EventKind>,
    deferred: DeferredQueue,
    /// Point the hover tooltip was last rendered for
    hovered_point: Option<DataPointRef>,
}

impl<H: ChartHost, S: TooltipSurface> TooltipController<H, S> {
    /// Attach to a chart using the default shared container
    pub fn attach(host: H, surface: S, hooks: TooltipHooks<S::Node>) -> Self {
        Self::attach_to_container(host, surface, hooks, CONTAINER_ID)
    }

    pub fn attach_to_container(
        host: H,
        surface: S,
        hooks: TooltipHooks<S::Node>,
        container_id: &str,
    ) -> Self {
        let id = Uuid::new_v4();
        let options = host.tooltip_options().filter(|options| options.enabled);

        let theme = options
            .as_ref()
            .and_then(|options| options.use_default_theme.then(TooltipTheme::default));
        let template = match (&hooks.content, &options) {
            (Some(content), _) => ContentTemplate::Function(content.clone()),
            (None, Some(options)) => ContentTemplate::Text(options.content.clone()),
            (None, None) => ContentTemplate::Text(String::new()),
        };

        let mut controller = Self {
            id,
            host,
            surface,
            options,
            template,
            hooks,
            store: TooltipStore::new(id, container_id, theme),
            subscriptions: Vec::new(),
            deferred: DeferredQueue::new(),
            hovered_point: None,
        };
        controller.subscribe();
        controller
    }

    fn subscribe(&mut self) {
        let Some(options) = self.options.as_ref() else {
            log::debug!("Tooltips disabled for chart {}", self.id);
            return;
        };

        if let Err(e) = ConfigValidator::validate(options) {
            log::warn!("Tooltip options for chart {} are invalid: {e}", self.id);
        }

        let mut kinds = vec![EventKind::PointerMove, EventKind::Hover, EventKind::Shutdown];
        if options.sticky_enabled {
            kinds.push(EventKind::Click);
        }

        for kind in kinds {
            self.host.subscribe(kind);
            self.subscriptions.push(kind);
        }

        log::debug!(
            "Tooltips attached to chart {} ({} events)",
            self.id,
            self.subscriptions.len()
        );
    }

    pub fn handle(&mut self, event: ChartEvent) {
        if !self.subscriptions.contains(&event.kind()) {
            log::trace!("Ignoring {:?} event for chart {}", event.kind(), self.id);
            return;
        }

        match event {
            ChartEvent::PointerMove { page } => self.on_pointer_move(page),
            ChartEvent::Hover { page, hit } => self.on_hover(page, hit.as_ref()),
            ChartEvent::Click { page, hit } => self.on_click(page, hit.as_ref()),
            ChartEvent::Shutdown => self.shutdown(),
        }
    }

    fn on_pointer_move(&mut self, page: Position) {
        let Some(options) = self.options.as_ref() else {
            return;
        };
        let Some(record) = self.store.get_mut(Slot::Hover) else {
            return;
        };

        let position = compute_position(
            page,
            record.node.outer_size(),
            self.surface.viewport(),
            options.shifts,
        );
        record.position = position;
        record.node.move_to(position);
        log::trace!("Hover tooltip moved to ({}, {})", position.x, position.y);
    }

    fn on_hover(&mut self, page: Position, hit: Option<&HitPoint>) {
        let Some(hit) = hit else {
            self.remove_slot(Slot::Hover);
            return;
        };

        if self.store.sticky_point() == Some(&hit.point) {
            self.remove_slot(Slot::Hover);
            return;
        }

        let Some(options) = self.options.as_ref() else {
            return;
        };

        let text = format_content(&self.template, hit, options, &self.host);
        let viewport = self.surface.viewport();

        let Some(record) = self.store.get_or_create_hover(&mut self.surface) else {
            return;
        };

        record.node.set_content(&text);
        let position = compute_position(page, record.node.outer_size(), viewport, options.shifts);
        record.position = position;
        record.node.move_to(position);
        record.node.show();
        self.hovered_point = Some(hit.point);

        if let Some(on_hover) = self.hooks.on_hover.as_mut() {
            on_hover(hit, &record.node);
        }
    }

    fn on_click(&mut self, page: Position, hit: Option<&HitPoint>) {
        let Some(sticky_class) = self.options.as_ref().map(|o| o.sticky_class_name.clone()) else {
            return;
        };

        let Some(hit) = hit else {
            self.clear_pin(&sticky_class);
            return;
        };

        if let Some(pinned) = self.store.sticky_point().copied() {
            if pinned == hit.point {
                self.unpin(hit, &sticky_class);
                return;
            }
            self.remove_slot(Slot::Sticky);
        }

        self.pin(page, hit, &sticky_class);
    }

    fn pin(&mut self, page: Position, hit: &HitPoint, sticky_class: &str) {
        if self.shown_hover_point() != Some(hit.point) {
            self.on_hover(page, Some(hit));
        }

        let Some(record) = self.store.pin(hit.point, &self.host) else {
            log::warn!("No hover tooltip to pin for chart {}", self.id);
            return;
        };

        record.node.add_class(sticky_class);
        self.hovered_point = None;
        self.deferred.push(DeferredTask::Highlight(hit.point));
        log::debug!(
            "Pinned tooltip to point {}:{}",
            hit.point.series_index,
            hit.point.data_index
        );

        if let Some(on_click) = self.hooks.on_click.as_mut() {
            on_click(Some(hit), Some(&record.node), true);
        }
    }

    fn unpin(&mut self, hit: &HitPoint, sticky_class: &str) {
        if let Some(record) = self.store.get_mut(Slot::Sticky) {
            record.node.remove_class(sticky_class);
        }

        let Some(point) = self.store.unpin(&self.host) else {
            return;
        };
        self.deferred.cancel_highlight(&point);
        self.host.unhighlight(point.series_index, point.data_index);
        self.hovered_point = Some(point);
        log::debug!("Unpinned point {}:{}", point.series_index, point.data_index);

        let node = self.store.get(Slot::Hover).map(|record| &record.node);
        if let Some(on_click) = self.hooks.on_click.as_mut() {
            on_click(Some(hit), node, false);
        }
    }

    fn clear_pin(&mut self, sticky_class: &str) {
        if let Some(record) = self.store.get_mut(Slot::Sticky) {
            record.node.remove_class(sticky_class);
        }

        let removed = self.remove_slot(Slot::Sticky);
        if let Some(on_click) = self.hooks.on_click.as_mut() {
            on_click(None, removed.as_ref().map(|record| &record.node), false);
        }
    }

    fn shown_hover_point(&self) -> Option<DataPointRef> {
        self.hovered_point.filter(|_| self.store.contains(Slot::Hover))
    }

    fn remove_slot(&mut self, slot: Slot) -> Option<TooltipRecord<S::Node>> {
        match slot {
            Slot::Hover => self.hovered_point = None,
            Slot::Sticky => {
                if let Some(point) = self.store.sticky_point().copied() {
                    self.deferred.cancel_highlight(&point);
                }
            }
        }
        self.store.remove(slot, &self.host)
    }

    /// Run the work queued during earlier events. Must be called by the host
    /// once the event that queued it has finished; returns how many host
    /// calls were made.
    pub fn flush_deferred(&mut self) -> usize {
        let mut executed = 0;

        for task in self.deferred.drain() {
            match task {
                DeferredTask::Highlight(point) => {
                    if self.store.sticky_point() == Some(&point) {
                        self.host.highlight(point.series_index, point.data_index);
                        executed += 1;
                    } else {
                        log::debug!(
                            "Dropping stale highlight for point {}:{}",
                            point.series_index,
                            point.data_index
                        );
                    }
                }
            }
        }

        executed
    }

    /// Remove a tooltip; hiding the sticky tooltip also clears its highlight
    pub fn hide_tooltip(&mut self, slot: Slot) {
        self.remove_slot(slot);
    }

    /// Detach from the chart and remove every node this chart created.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        for kind in self.subscriptions.drain(..) {
            self.host.unsubscribe(kind);
        }

        self.remove_slot(Slot::Hover);
        self.remove_slot(Slot::Sticky);
        self.deferred.clear();

        let container_id = self.store.container_id().to_string();
        let release = OverlayRegistry::release_chart(&container_id, self.id);
        if !release.orphaned_nodes.is_empty() {
            log::warn!(
                "Chart {} released {} orphaned tooltip nodes",
                self.id,
                release.orphaned_nodes.len()
            );
        }
        if release.container_removed {
            self.surface.remove_container(&container_id);
            log::debug!("Removed tooltip container {container_id}");
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.options.is_some()
    }

    pub fn options(&self) -> Option<&TooltipOptions> {
        self.options.as_ref()
    }

    pub fn store(&self) -> &TooltipStore<S> {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn subscriptions(&self) -> &[EventKind] {
        &self.subscriptions
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }
}

impl<H: ChartHost, S: TooltipSurface> Drop for TooltipController<H, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessNode, HeadlessSurface, HostCommand, RecordingHost};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tooltip_shared::{Size, Viewport};

    type Controller = TooltipController<RecordingHost, HeadlessSurface>;

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(Viewport::new(800.0, 600.0)).with_node_size(Size::new(100.0, 20.0))
    }

    fn controller(options: TooltipOptions) -> Controller {
        OverlayRegistry::clear_all();
        TooltipController::attach(RecordingHost::new(Some(options)), surface(), TooltipHooks::new())
    }

    fn hover(x: f64, y: f64, hit: &HitPoint) -> ChartEvent {
        ChartEvent::Hover {
            page: Position::new(x, y),
            hit: Some(hit.clone()),
        }
    }

    fn click(hit: &HitPoint) -> ChartEvent {
        ChartEvent::Click {
            page: Position::new(50.0, 50.0),
            hit: Some(hit.clone()),
        }
    }

    #[test]
    fn test_disabled_chart_subscribes_nothing() {
        let controller = TooltipController::attach(
            RecordingHost::new(Some(TooltipOptions::default())),
            surface(),
            TooltipHooks::new(),
        );
        assert!(!controller.is_enabled());
        assert!(controller.host().subscriptions().is_empty());

        let controller = TooltipController::attach(RecordingHost::new(None), surface(), TooltipHooks::new());
        assert!(!controller.is_enabled());
        assert!(controller.subscriptions().is_empty());
    }

    #[test]
    fn test_click_subscription_follows_sticky_mode() {
        let plain = controller(TooltipOptions::enabled());
        assert!(!plain.subscriptions().contains(&EventKind::Click));

        let sticky = controller(TooltipOptions::enabled().with_sticky(true));
        assert_eq!(
            sticky.host().subscriptions(),
            vec![
                EventKind::PointerMove,
                EventKind::Hover,
                EventKind::Shutdown,
                EventKind::Click
            ]
        );
    }

    #[test]
    fn test_hover_renders_and_positions() {
        let mut controller = controller(TooltipOptions::enabled().with_content("%s: %y.1"));
        let hit = HitPoint::new(0, 3, 1.0, 2.26).with_label("Load");

        controller.handle(hover(100.0, 100.0, &hit));

        let record = controller.store().get(Slot::Hover).unwrap();
        let element = record.node.snapshot().unwrap();
        assert_eq!(element.content, "Load: 2.3");
        assert_eq!(element.position, Position::new(110.0, 120.0));
        assert!(element.visible);
    }

    #[test]
    fn test_hover_off_removes_tooltip() {
        let mut controller = controller(TooltipOptions::enabled());
        controller.handle(hover(10.0, 10.0, &HitPoint::new(0, 0, 1.0, 1.0)));

        controller.handle(ChartEvent::Hover {
            page: Position::new(10.0, 10.0),
            hit: None,
        });

        assert!(controller.store().is_empty());
        assert!(controller.surface().document().borrow().children(CONTAINER_ID).is_empty());
    }

    #[test]
    fn test_pointer_move_never_creates_or_moves_sticky() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true));
        controller.handle(ChartEvent::PointerMove {
            page: Position::new(5.0, 5.0),
        });
        assert!(controller.store().is_empty());

        let hit = HitPoint::new(0, 0, 1.0, 1.0);
        controller.handle(hover(20.0, 20.0, &hit));
        controller.handle(click(&hit));
        let pinned_at = controller.store().get(Slot::Sticky).unwrap().position;

        controller.handle(ChartEvent::PointerMove {
            page: Position::new(300.0, 300.0),
        });

        let sticky = controller.store().get(Slot::Sticky).unwrap();
        assert_eq!(sticky.position, pinned_at);
        assert_eq!(sticky.node.snapshot().unwrap().position, pinned_at);
        assert!(!controller.store().contains(Slot::Hover));
    }

    #[test]
    fn test_pin_highlights_after_flush() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true));
        let hit = HitPoint::new(1, 4, 2.0, 3.0);
        controller.handle(hover(20.0, 20.0, &hit));
        controller.handle(click(&hit));

        let sticky = controller.store().get(Slot::Sticky).unwrap();
        assert!(sticky.node.snapshot().unwrap().has_class("flotTipSticky"));
        assert!(controller.host().commands().is_empty());
        assert_eq!(controller.pending_tasks(), 1);

        assert_eq!(controller.flush_deferred(), 1);
        assert_eq!(controller.host().commands(), vec![HostCommand::Highlight(1, 4)]);
    }

    #[test]
    fn test_click_without_hover_synthesizes_one() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true).with_content("%x.0"));
        let hit = HitPoint::new(0, 2, 7.0, 1.0);

        controller.handle(click(&hit));

        let sticky = controller.store().get(Slot::Sticky).unwrap();
        let element = sticky.node.snapshot().unwrap();
        assert_eq!(element.content, "7");
        assert!(element.visible);
        assert_eq!(controller.store().sticky_point(), Some(&hit.point));
    }

    #[test]
    fn test_click_on_stale_hover_rerenders() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true).with_content("%x.0"));
        let shown = HitPoint::new(0, 0, 1.0, 1.0);
        let clicked = HitPoint::new(0, 1, 2.0, 1.0);

        controller.handle(hover(10.0, 10.0, &shown));
        controller.handle(click(&clicked));

        let element = controller.store().get(Slot::Sticky).unwrap().node.snapshot().unwrap();
        assert_eq!(element.content, "2");
    }

    #[test]
    fn test_unpin_turns_sticky_back_into_hover() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true));
        let hit = HitPoint::new(0, 5, 1.0, 2.0);
        controller.handle(hover(20.0, 20.0, &hit));
        controller.handle(click(&hit));
        controller.flush_deferred();
        let node_id = controller.store().get(Slot::Sticky).unwrap().node_id.clone();

        controller.handle(click(&hit));

        assert!(!controller.store().contains(Slot::Sticky));
        let hover = controller.store().get(Slot::Hover).unwrap();
        assert_eq!(hover.node_id, node_id);
        assert!(!hover.node.snapshot().unwrap().has_class("flotTipSticky"));
        assert!(controller.host().highlighted().is_empty());
    }

    #[test]
    fn test_hover_over_pinned_point_is_suppressed() {
        let mut controller = controller(TooltipOptions::enabled().with_sticky(true));
        let hit = HitPoint::new(0, 0, 4.0, 4.0);
        controller.handle(hover(20.0, 20.0, &hit));
        controller.handle(click(&hit));

        controller.handle(hover(25.0, 25.0, &HitPoint::new(3, 8, 4.0, 4.0)));

        assert!(!controller.store().contains(Slot::Hover));
        assert_eq!(controller.store().len(), 1);
    }

    #[test]
    fn test_empty_click_clears_pin() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let hooks = TooltipHooks::new().on_click(
            move |hit: Option<&HitPoint>, node: Option<&HeadlessNode>, pinned: bool| {
                log.borrow_mut().push((hit.is_some(), node.is_some(), pinned));
            },
        );

        OverlayRegistry::clear_all();
        let mut controller = TooltipController::attach(
            RecordingHost::new(Some(TooltipOptions::enabled().with_sticky(true))),
            surface(),
            hooks,
        );
        let hit = HitPoint::new(0, 1, 1.0, 1.0);
        controller.handle(click(&hit));
        controller.handle(ChartEvent::Click {
            page: Position::new(0.0, 0.0),
            hit: None,
        });

        assert!(controller.store().is_empty());
        assert_eq!(controller.pending_tasks(), 0);
        assert_eq!(controller.host().commands(), vec![HostCommand::Unhighlight(0, 1)]);
        assert_eq!(*seen.borrow(), vec![(true, true, true), (false, true, false)]);
    }

    #[test]
    fn test_hover_hook_receives_point_and_node() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let hooks = TooltipHooks::new().on_hover(move |hit: &HitPoint, node: &HeadlessNode| {
            let content = node.snapshot().map(|element| element.content).unwrap_or_default();
            log.borrow_mut().push((hit.point, node.id().to_string(), content));
        });

        OverlayRegistry::clear_all();
        let options = TooltipOptions::enabled().with_sticky(true).with_content("%x.0");
        let mut controller = TooltipController::attach(RecordingHost::new(Some(options)), surface(), hooks);

        let hovered = HitPoint::new(0, 1, 3.0, 1.0);
        let clicked = HitPoint::new(1, 4, 9.0, 2.0);
        controller.handle(hover(10.0, 10.0, &hovered));
        let node_id = controller.store().get(Slot::Hover).unwrap().node_id.clone();

        // Clicking another point renders it through the hover path first
        controller.handle(click(&clicked));
        assert_eq!(controller.store().get(Slot::Sticky).unwrap().node_id, node_id);

        // Hovering the pinned point shows nothing and calls nothing
        controller.handle(hover(12.0, 12.0, &clicked));

        assert_eq!(
            *seen.borrow(),
            vec![
                (hovered.point, node_id.clone(), "3".to_string()),
                (clicked.point, node_id, "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_unpin_reports_returned_node_to_click_hook() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let hooks = TooltipHooks::new().on_click(
            move |hit: Option<&HitPoint>, node: Option<&HeadlessNode>, pinned: bool| {
                log.borrow_mut()
                    .push((hit.map(|hit| hit.point), node.map(|node| node.id().to_string()), pinned));
            },
        );

        OverlayRegistry::clear_all();
        let mut controller = TooltipController::attach(
            RecordingHost::new(Some(TooltipOptions::enabled().with_sticky(true))),
            surface(),
            hooks,
        );
        let hit = HitPoint::new(0, 5, 1.0, 2.0);
        controller.handle(hover(20.0, 20.0, &hit));
        controller.handle(click(&hit));
        let node_id = controller.store().get(Slot::Sticky).unwrap().node_id.clone();

        controller.handle(click(&hit));

        assert_eq!(controller.store().get(Slot::Hover).unwrap().node_id, node_id);
        assert_eq!(
            *seen.borrow(),
            vec![
                (Some(hit.point), Some(node_id.clone()), true),
                (Some(hit.point), Some(node_id), false),
            ]
        );
    }

    #[test]
    fn test_hide_tooltip_is_idempotent() {
        let mut controller = controller(TooltipOptions::enabled());
        controller.handle(hover(20.0, 20.0, &HitPoint::new(0, 0, 1.0, 1.0)));

        controller.hide_tooltip(Slot::Hover);
        controller.hide_tooltip(Slot::Hover);
        controller.hide_tooltip(Slot::Sticky);

        assert!(controller.store().is_empty());
        assert!(controller.host().commands().is_empty());
    }

    #[test]
    fn test_unsubscribed_events_are_ignored() {
        let mut controller = controller(TooltipOptions::enabled());
        let hit = HitPoint::new(0, 0, 1.0, 1.0);

        controller.handle(click(&hit));

        assert!(controller.store().is_empty());
    }
}
