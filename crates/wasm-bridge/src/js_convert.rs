//! Conversions between JavaScript values and engine types

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect, JSON};
use tooltip_engine::{
    AxisInfo, AxisMode, ConfigFormat, ConfigParser, HitPoint, HitPointDto, Position, SeriesInfo,
    TooltipHooks, TooltipOptions,
};
use tooltip_shared::{TooltipError, TooltipResult};
use wasm_bindgen::{JsCast, JsValue};

use crate::dom::DomNode;

pub(crate) fn to_js_error(error: TooltipError) -> JsValue {
    JsValue::from_str(&error.to_json())
}

fn interop_error(context: &str, value: JsValue) -> TooltipError {
    TooltipError::JsInterop {
        message: format!("{context}: {value:?}"),
    }
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn is_missing(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

pub(crate) fn axis_mode(mode: Option<&str>) -> AxisMode {
    match mode {
        Some("time") => AxisMode::Time,
        _ => AxisMode::Linear,
    }
}

/// Read flot plot options (`{ tooltip, tooltipOpts }`); function-valued
/// entries are skipped here and picked up by [`hooks_from_options`]
pub fn parse_plot_options(options: &JsValue) -> TooltipResult<Option<TooltipOptions>> {
    if is_missing(options) {
        return Ok(None);
    }

    let json: String = JSON::stringify(options)
        .map_err(|e| interop_error("Cannot serialize plot options", e))?
        .into();
    ConfigParser::parse_plot_options(&json, ConfigFormat::Json)
}

fn function_option(options: &JsValue, key: &str) -> Option<Function> {
    get(&get(options, "tooltipOpts"), key).dyn_into::<Function>().ok()
}

fn hit_to_js(hit: &HitPoint) -> JsValue {
    serde_wasm_bindgen::to_value(&hit.to_dto()).unwrap_or(JsValue::NULL)
}

/// `pageX`/`pageY` of a flot position object or pointer event
pub fn page_position(value: &JsValue) -> Position {
    let coordinate = |key: &str| get(value, key).as_f64().unwrap_or(0.0);
    Position::new(coordinate("pageX"), coordinate("pageY"))
}

/// The flot item of the event being dispatched. Callbacks get this object
/// as-is, so `item.series.xaxis` and friends stay reachable.
#[derive(Clone)]
pub struct CurrentItem(Rc<RefCell<JsValue>>);

impl Default for CurrentItem {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(JsValue::UNDEFINED)))
    }
}

impl CurrentItem {
    /// Run `f` with `item` as the current item
    pub fn scope<T>(&self, item: &JsValue, f: impl FnOnce() -> T) -> T {
        let previous = self.0.replace(item.clone());
        let result = f();
        self.0.replace(previous);
        result
    }

    /// The current item, or the serialized hit point outside a dispatch
    fn for_hit(&self, hit: &HitPoint) -> JsValue {
        let item = self.0.borrow().clone();
        if is_missing(&item) {
            hit_to_js(hit)
        } else {
            item
        }
    }
}

/// Wrap a tooltip element with jQuery when the page has it, matching what
/// flot callbacks expect
fn tip_handle(node: &DomNode) -> JsValue {
    let element = JsValue::from(node.element().clone());
    let jquery = get(&js_sys::global(), "jQuery");

    match jquery.dyn_ref::<Function>() {
        Some(jquery) => jquery.call1(&JsValue::UNDEFINED, &element).unwrap_or(element),
        None => element,
    }
}

/// Build runtime hooks from `tooltipOpts.content`, `onHover` and `onClick`
/// when they are functions.
///
/// `content` is called as `(label, x, y, item, plot)`, `onHover` as
/// `(item, tip)` on the options object and `onClick` as
/// `(item, tip, pinned)` with `this` set to the plot.
pub fn hooks_from_options(options: &JsValue, plot: &JsValue, current: &CurrentItem) -> TooltipHooks<DomNode> {
    let mut hooks = TooltipHooks::new();
    if is_missing(options) {
        return hooks;
    }

    if let Some(content) = function_option(options, "content") {
        let plot = plot.clone();
        let current = current.clone();
        hooks = hooks.with_content(move |label, x, y, hit, _chart| {
            let args = Array::new();
            args.push(&label.map(JsValue::from_str).unwrap_or(JsValue::UNDEFINED));
            args.push(&JsValue::from_f64(x));
            args.push(&JsValue::from_f64(y));
            args.push(&current.for_hit(hit));
            args.push(&plot);

            match content.apply(&JsValue::UNDEFINED, &args) {
                Ok(text) => text.as_string().unwrap_or_default(),
                Err(e) => {
                    log::warn!("Tooltip content function failed: {e:?}");
                    String::new()
                }
            }
        });
    }

    if let Some(on_hover) = function_option(options, "onHover") {
        let tooltip_opts = get(options, "tooltipOpts");
        let current = current.clone();
        hooks = hooks.on_hover(move |hit, node: &DomNode| {
            if let Err(e) = on_hover.call2(&tooltip_opts, &current.for_hit(hit), &tip_handle(node)) {
                log::warn!("Tooltip onHover failed: {e:?}");
            }
        });
    }

    if let Some(on_click) = function_option(options, "onClick") {
        let plot = plot.clone();
        let current = current.clone();
        hooks = hooks.on_click(move |hit, node: Option<&DomNode>, pinned| {
            let item = hit.map(|hit| current.for_hit(hit)).unwrap_or(JsValue::NULL);
            let tip = node.map(tip_handle).unwrap_or(JsValue::NULL);
            if let Err(e) = on_click.call3(&plot, &item, &tip, &JsValue::from_bool(pinned)) {
                log::warn!("Tooltip onClick failed: {e:?}");
            }
        });
    }

    hooks
}

fn axis_from_js(axis: &JsValue) -> AxisInfo {
    let mode = axis_mode(get(&get(axis, "options"), "mode").as_string().as_deref());
    let mut info = AxisInfo {
        mode,
        tick_formatter: None,
    };

    if let Ok(formatter) = get(axis, "tickFormatter").dyn_into::<Function>() {
        let axis = axis.clone();
        info = info.with_tick_formatter(move |value, _| {
            match formatter.call2(&axis, &JsValue::from_f64(value), &axis) {
                Ok(text) => text
                    .as_string()
                    .or_else(|| text.as_f64().map(|n| n.to_string()))
                    .unwrap_or_default(),
                Err(e) => {
                    log::warn!("Axis tick formatter failed: {e:?}");
                    value.to_string()
                }
            }
        });
    }

    info
}

fn index(item: &JsValue, key: &str) -> TooltipResult<usize> {
    get(item, key)
        .as_f64()
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
        .ok_or_else(|| TooltipError::JsInterop {
            message: format!("Hit item has no valid {key}"),
        })
}

/// Read the hit item passed with `plothover`/`plotclick`.
///
/// Accepts flot's item object (`seriesIndex`, `dataIndex`, `datapoint`,
/// `series`) or the flat serialized hit point form.
pub fn hit_from_js(item: &JsValue) -> TooltipResult<Option<HitPoint>> {
    if is_missing(item) {
        return Ok(None);
    }

    let series = get(item, "series");
    if is_missing(&series) {
        let dto: HitPointDto = serde_wasm_bindgen::from_value(item.clone()).map_err(|e| {
            TooltipError::JsInterop {
                message: format!("Invalid hit item: {e}"),
            }
        })?;
        return Ok(Some(HitPoint::from(dto)));
    }

    let datapoint: Array = get(item, "datapoint")
        .dyn_into()
        .map_err(|v| interop_error("Hit item has no datapoint array", v))?;
    let coordinate = |i: u32| datapoint.get(i).as_f64().unwrap_or(f64::NAN);

    let mut hit = HitPoint::new(
        index(item, "seriesIndex")?,
        index(item, "dataIndex")?,
        coordinate(0),
        coordinate(1),
    );
    hit.series = SeriesInfo {
        label: get(&series, "label").as_string(),
        percent: get(&series, "percent").as_f64(),
        x_axis: axis_from_js(&get(&series, "xaxis")),
        y_axis: axis_from_js(&get(&series, "yaxis")),
    };

    Ok(Some(hit))
}
