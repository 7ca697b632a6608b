//! WASM bridge for chart tooltips
//! Exposes the tooltip controller to JavaScript with a DOM-backed surface

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Once;

use js_sys::{Array, Function};
use tooltip_engine::{ChartEvent, EventKind, Position, Slot, TooltipController};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod dom;
pub mod js_convert;
pub mod js_host;

use dom::DomSurface;
use js_convert::{
    hit_from_js, hooks_from_options, page_position, parse_plot_options, to_js_error, CurrentItem,
};
use js_host::{EventSink, JsChartHost};

type DomController = TooltipController<JsChartHost, DomSurface>;

static INIT: Once = Once::new();

fn init_runtime() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        // Another bridge on the page may already own the logger
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

fn busy() -> JsValue {
    JsValue::from_str("Chart tooltips are busy")
}

/// Tooltips for one flot plot.
///
/// Listens on the plot's placeholder for `plothover`, `plotclick` and
/// `mousemove` and tears itself down from the plot's `shutdown` hook. Pages
/// whose plot object lacks those hooks forward the events listed by
/// [`ChartTooltips::events`] to `pointerMove`, `hover` and `click`. Pin
/// highlights are applied on the next tick with `setTimeout(0)`.
#[wasm_bindgen]
pub struct ChartTooltips {
    state: Rc<BridgeState>,
}

struct BridgeState {
    controller: RefCell<DomController>,
    current_item: CurrentItem,
    flush_scheduled: Cell<bool>,
}

#[wasm_bindgen]
impl ChartTooltips {
    /// `plot` is the flot plot object, `options` its plot options
    /// (`{ tooltip: true, tooltipOpts: {...} }`)
    #[wasm_bindgen(constructor)]
    pub fn new(plot: JsValue, options: JsValue) -> Result<ChartTooltips, JsValue> {
        init_runtime();

        let tooltip_options = parse_plot_options(&options).map_err(to_js_error)?;
        let surface = DomSurface::from_window().map_err(to_js_error)?;
        let current_item = CurrentItem::default();
        let hooks = hooks_from_options(&options, &plot, &current_item);

        let state = Rc::new_cyclic(|weak: &Weak<BridgeState>| {
            let weak = weak.clone();
            let sink: EventSink = Rc::new(move |kind, position, item| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = state.forward(kind, &position, &item) {
                    log::warn!("Dropped plot {} event: {e:?}", kind.host_event_name());
                }
            });

            let host = JsChartHost::new(plot, tooltip_options, sink);
            BridgeState {
                controller: RefCell::new(TooltipController::attach(host, surface, hooks)),
                current_item,
                flush_scheduled: Cell::new(false),
            }
        });

        if let Ok(controller) = state.controller.try_borrow() {
            log::info!(
                "Chart tooltips {} created (enabled: {}, bound: {:?})",
                controller.id(),
                controller.is_enabled(),
                controller.host().bound_events()
            );
        }

        Ok(ChartTooltips { state })
    }

    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.state.controller.try_borrow().map(|c| c.is_enabled()).unwrap_or(false)
    }

    /// Host event names the tooltips subscribed to, e.g.
    /// `["mousemove", "plothover", "shutdown"]`
    #[wasm_bindgen]
    pub fn events(&self) -> Result<Array, JsValue> {
        let controller = self.state.controller.try_borrow().map_err(|_| busy())?;
        Ok(controller.host().subscribed_events().into_iter().map(JsValue::from_str).collect())
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, page_x: f64, page_y: f64) -> Result<(), JsValue> {
        self.state.dispatch(ChartEvent::PointerMove {
            page: Position::new(page_x, page_y),
        })
    }

    #[wasm_bindgen]
    pub fn hover(&self, page_x: f64, page_y: f64, item: JsValue) -> Result<(), JsValue> {
        self.state.hover(Position::new(page_x, page_y), &item)
    }

    #[wasm_bindgen]
    pub fn click(&self, page_x: f64, page_y: f64, item: JsValue) -> Result<(), JsValue> {
        self.state.click(Position::new(page_x, page_y), &item)
    }

    /// Remove the `"hover"` or `"sticky"` tooltip
    #[wasm_bindgen(js_name = hideTooltip)]
    pub fn hide_tooltip(&self, slot: &str) -> Result<(), JsValue> {
        let slot: Slot = slot.parse().map_err(to_js_error)?;
        self.state.with_controller(|controller| controller.hide_tooltip(slot))
    }

    #[wasm_bindgen]
    pub fn shutdown(&self) -> Result<(), JsValue> {
        self.state.dispatch(ChartEvent::Shutdown)
    }
}

impl BridgeState {
    fn forward(self: &Rc<Self>, kind: EventKind, position: &JsValue, item: &JsValue) -> Result<(), JsValue> {
        let page = page_position(position);
        match kind {
            EventKind::PointerMove => self.dispatch(ChartEvent::PointerMove { page }),
            EventKind::Hover => self.hover(page, item),
            EventKind::Click => self.click(page, item),
            EventKind::Shutdown => self.dispatch(ChartEvent::Shutdown),
        }
    }

    fn hover(&self, page: Position, item: &JsValue) -> Result<(), JsValue> {
        let hit = hit_from_js(item).map_err(to_js_error)?;
        self.current_item
            .scope(item, || self.dispatch(ChartEvent::Hover { page, hit }))
    }

    fn click(self: &Rc<Self>, page: Position, item: &JsValue) -> Result<(), JsValue> {
        let hit = hit_from_js(item).map_err(to_js_error)?;
        self.current_item
            .scope(item, || self.dispatch(ChartEvent::Click { page, hit }))?;
        self.schedule_flush()
    }

    fn dispatch(&self, event: ChartEvent) -> Result<(), JsValue> {
        self.with_controller(|controller| controller.handle(event))
    }

    /// Hooks run inside the controller, so a hook calling back into the
    /// bridge gets an error instead of a borrow panic
    fn with_controller(&self, f: impl FnOnce(&mut DomController)) -> Result<(), JsValue> {
        let mut controller = self.controller.try_borrow_mut().map_err(|_| busy())?;
        f(&mut controller);
        Ok(())
    }

    fn schedule_flush(self: &Rc<Self>) -> Result<(), JsValue> {
        let pending = self.controller.try_borrow().map(|c| c.pending_tasks()).unwrap_or(0);
        if pending == 0 || self.flush_scheduled.get() {
            return Ok(());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let state = Rc::downgrade(self);
        let callback = Closure::once_into_js(move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            state.flush_scheduled.set(false);
            match state.controller.try_borrow_mut() {
                Ok(mut controller) => {
                    controller.flush_deferred();
                }
                Err(_) => log::warn!("Skipped tooltip highlight flush, controller busy"),
            };
        });

        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref::<Function>(), 0)?;
        self.flush_scheduled.set(true);
        Ok(())
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use js_sys::{Object, Reflect};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn set(target: &JsValue, key: &str, value: &JsValue) {
        Reflect::set(target, &JsValue::from_str(key), value).unwrap();
    }

    fn read(target: &JsValue, key: &str) -> JsValue {
        Reflect::get(target, &JsValue::from_str(key)).unwrap()
    }

    fn plot_options(sticky: bool) -> JsValue {
        let opts: JsValue = Object::new().into();
        set(&opts, "stickyable", &JsValue::from_bool(sticky));
        set(&opts, "content", &"%s: %y.1".into());
        let options: JsValue = Object::new().into();
        set(&options, "tooltip", &JsValue::TRUE);
        set(&options, "tooltipOpts", &opts);
        options
    }

    /// Plot object without placeholder or hooks
    fn bare_plot() -> JsValue {
        let plot: JsValue = Object::new().into();
        let noop = Function::new_no_args("");
        set(&plot, "highlight", &noop);
        set(&plot, "unhighlight", &noop);
        plot
    }

    /// Plot object shaped like flot's: a placeholder recording bound handlers
    /// in `plot.bound` and a `shutdown` that runs `plot.hooks.shutdown`
    fn flot_plot() -> JsValue {
        Function::new_no_args(
            "var bound = {};
             var placeholder = {
                 bind: function (name, fn) { bound[name] = fn; },
                 unbind: function (name, fn) { if (bound[name] === fn) { delete bound[name]; } }
             };
             return {
                 bound: bound,
                 highlighted: [],
                 hooks: { shutdown: [] },
                 highlight: function (s, d) { this.highlighted.push([s, d]); },
                 unhighlight: function () {},
                 getPlaceholder: function () { return placeholder; },
                 shutdown: function () {
                     var hooks = this.hooks.shutdown;
                     for (var i = 0; i < hooks.length; ++i) { hooks[i](this, null); }
                 }
             };",
        )
        .call0(&JsValue::NULL)
        .unwrap()
    }

    fn item() -> JsValue {
        let item: JsValue = Object::new().into();
        set(&item, "seriesIndex", &JsValue::from_f64(0.0));
        set(&item, "dataIndex", &JsValue::from_f64(2.0));
        let datapoint = Array::of2(&JsValue::from_f64(1.0), &JsValue::from_f64(4.26));
        set(&item, "datapoint", &datapoint);
        let series: JsValue = Object::new().into();
        set(&series, "label", &"Temp".into());
        set(&item, "series", &series);
        item
    }

    fn page(x: f64, y: f64) -> JsValue {
        let position: JsValue = Object::new().into();
        set(&position, "pageX", &JsValue::from_f64(x));
        set(&position, "pageY", &JsValue::from_f64(y));
        position
    }

    fn container() -> Option<web_sys::Element> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("flotTips"))
    }

    fn container_children() -> u32 {
        container().map(|c| c.child_element_count()).unwrap_or(0)
    }

    fn bound_names(plot: &JsValue) -> u32 {
        Object::keys(read(plot, "bound").unchecked_ref()).length()
    }

    fn trigger(plot: &JsValue, event: &str, args: &Array) {
        let handler: Function = read(&read(plot, "bound"), event).dyn_into().unwrap();
        handler.apply(&JsValue::NULL, args).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_hover_renders_into_dom() {
        let tooltips = ChartTooltips::new(bare_plot(), plot_options(false)).unwrap();
        assert!(tooltips.enabled());

        tooltips.hover(10.0, 10.0, item()).unwrap();
        assert_eq!(container_children(), 1);

        tooltips.shutdown().unwrap();
        assert_eq!(container_children(), 0);
    }

    #[wasm_bindgen_test]
    fn test_sticky_subscribes_to_clicks() {
        let tooltips = ChartTooltips::new(bare_plot(), plot_options(true)).unwrap();
        let events = tooltips.events().unwrap();
        assert_eq!(events.length(), 4);

        tooltips.click(10.0, 10.0, item()).unwrap();
        tooltips.hide_tooltip("sticky").unwrap();
        assert!(tooltips.hide_tooltip("elsewhere").is_err());
        tooltips.shutdown().unwrap();
    }

    #[wasm_bindgen_test]
    fn test_disabled_without_tooltip_switch() {
        let tooltips = ChartTooltips::new(bare_plot(), JsValue::UNDEFINED).unwrap();
        assert!(!tooltips.enabled());
        assert_eq!(tooltips.events().unwrap().length(), 0);
    }

    #[wasm_bindgen_test]
    fn test_plot_events_are_bound_and_released_by_shutdown_hook() {
        let plot = flot_plot();
        let tooltips = ChartTooltips::new(plot.clone(), plot_options(true)).unwrap();
        assert_eq!(bound_names(&plot), 3);
        assert_eq!(Array::from(&read(&read(&plot, "hooks"), "shutdown")).length(), 1);

        trigger(&plot, "plothover", &Array::of3(&JsValue::NULL, &page(10.0, 10.0), &item()));
        assert_eq!(container_children(), 1);

        trigger(&plot, "mousemove", &Array::of1(&page(40.0, 50.0)));
        let tip: web_sys::HtmlElement = container().unwrap().first_element_child().unwrap().unchecked_into();
        assert_eq!(tip.style().get_property_value("left").unwrap(), "50px");
        assert_eq!(tip.style().get_property_value("top").unwrap(), "70px");

        let shutdown: Function = read(&plot, "shutdown").dyn_into().unwrap();
        shutdown.call0(&plot).unwrap();

        assert_eq!(bound_names(&plot), 0);
        assert_eq!(container_children(), 0);
        assert_eq!(tooltips.events().unwrap().length(), 0);

        // The replaced hook entry is a no-op
        shutdown.call0(&plot).unwrap();
    }

    #[wasm_bindgen_test]
    fn test_callbacks_receive_flot_item_and_plot() {
        let plot = flot_plot();
        let options = plot_options(true);
        let opts = read(&options, "tooltipOpts");
        let content = Function::new_with_args(
            "label, x, y, item, plot",
            "return label + ':' + item.dataIndex + ':' + y + ':' + (typeof plot.getPlaceholder);",
        );
        set(&opts, "content", &content);
        let on_hover = Function::new_with_args("item, tip", "this.hovered = item.series.label;");
        set(&opts, "onHover", &on_hover);
        let on_click = Function::new_with_args("item, tip, pinned", "this.clicked = [item.dataIndex, pinned];");
        set(&opts, "onClick", &on_click);

        let tooltips = ChartTooltips::new(plot.clone(), options).unwrap();
        trigger(&plot, "plotclick", &Array::of3(&JsValue::NULL, &page(10.0, 10.0), &item()));

        let tip = container().unwrap().first_element_child().unwrap();
        assert_eq!(tip.inner_html(), "Temp:2:4.26:function");
        assert_eq!(read(&opts, "hovered").as_string().as_deref(), Some("Temp"));

        let clicked = Array::from(&read(&plot, "clicked"));
        assert_eq!(clicked.get(0).as_f64(), Some(2.0));
        assert_eq!(clicked.get(1).as_bool(), Some(true));

        tooltips.shutdown().unwrap();
        assert_eq!(bound_names(&plot), 0);
    }
}
