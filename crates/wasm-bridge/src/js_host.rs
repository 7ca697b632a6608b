//! Adapter exposing a JavaScript flot plot object as a chart host

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use tooltip_engine::{ChartHost, EventKind, TooltipOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Receives plot events as `(kind, position, item)`. The position carries
/// `pageX`/`pageY`; the item is the flot hit item, undefined for pointer
/// moves and shutdown.
pub type EventSink = Rc<dyn Fn(EventKind, JsValue, JsValue)>;

type Handler = Closure<dyn FnMut(JsValue, JsValue, JsValue)>;

struct Listener {
    kind: EventKind,
    handler: Handler,
}

/// Host events in the order the controller subscribed to them
pub(crate) fn host_event_names(kinds: &[EventKind]) -> Vec<&'static str> {
    kinds.iter().map(EventKind::host_event_name).collect()
}

fn call_method(target: &JsValue, method: &str, args: &Array) -> Result<JsValue, JsValue> {
    let function: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    function.apply(target, args)
}

fn shutdown_hooks(plot: &JsValue) -> Result<Array, JsValue> {
    let hooks = Reflect::get(plot, &JsValue::from_str("hooks"))?;
    Ok(Reflect::get(&hooks, &JsValue::from_str("shutdown"))?.dyn_into()?)
}

/// Wraps the plot object handed in from JavaScript.
///
/// Subscribing binds a handler on the plot placeholder (`plothover`,
/// `plotclick`, `mousemove`) or pushes one onto `plot.hooks.shutdown`.
/// Plots without those hooks keep the subscription list only; the page then
/// forwards the events itself.
pub struct JsChartHost {
    plot: JsValue,
    /// jQuery-wrapped element from `plot.getPlaceholder()`
    placeholder: Option<JsValue>,
    options: Option<TooltipOptions>,
    sink: EventSink,
    subscriptions: RefCell<Vec<EventKind>>,
    listeners: RefCell<Vec<Listener>>,
    /// Unbound handlers, kept alive since one may still be on the stack
    retired: RefCell<Vec<Handler>>,
}

impl JsChartHost {
    pub fn new(plot: JsValue, options: Option<TooltipOptions>, sink: EventSink) -> Self {
        let placeholder = call_method(&plot, "getPlaceholder", &Array::new())
            .ok()
            .filter(|placeholder| !placeholder.is_undefined() && !placeholder.is_null());

        Self {
            plot,
            placeholder,
            options,
            sink,
            subscriptions: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            retired: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribed_events(&self) -> Vec<&'static str> {
        host_event_names(&self.subscriptions.borrow())
    }

    /// Subscribed events that are delivered without help from the page
    pub fn bound_events(&self) -> Vec<&'static str> {
        let kinds: Vec<EventKind> = self.listeners.borrow().iter().map(|l| l.kind).collect();
        host_event_names(&kinds)
    }

    fn handler(&self, kind: EventKind) -> Handler {
        let sink = Rc::clone(&self.sink);
        Closure::wrap(Box::new(move |first: JsValue, second: JsValue, third: JsValue| match kind {
            // mousemove handlers receive the event itself
            EventKind::PointerMove => sink(kind, first, JsValue::UNDEFINED),
            EventKind::Hover | EventKind::Click => sink(kind, second, third),
            EventKind::Shutdown => sink(kind, JsValue::UNDEFINED, JsValue::UNDEFINED),
        }) as Box<dyn FnMut(JsValue, JsValue, JsValue)>)
    }

    fn bind(&self, kind: EventKind, handler: &JsValue) -> Result<(), JsValue> {
        if kind == EventKind::Shutdown {
            shutdown_hooks(&self.plot)?.push(handler);
            return Ok(());
        }

        let placeholder = self
            .placeholder
            .as_ref()
            .ok_or_else(|| JsValue::from_str("plot has no placeholder"))?;
        let args = Array::of2(&JsValue::from_str(kind.host_event_name()), handler);
        call_method(placeholder, "bind", &args).map(|_| ())
    }

    fn unbind(&self, kind: EventKind, handler: &JsValue) -> Result<(), JsValue> {
        if kind == EventKind::Shutdown {
            // Flot may be walking the hook list right now, so the entry is
            // replaced rather than spliced out
            let hooks = shutdown_hooks(&self.plot)?;
            let index = hooks.index_of(handler, 0);
            if index >= 0 {
                hooks.set(index as u32, Function::new_no_args("").into());
            }
            return Ok(());
        }

        let Some(placeholder) = self.placeholder.as_ref() else {
            return Ok(());
        };
        let args = Array::of2(&JsValue::from_str(kind.host_event_name()), handler);
        call_method(placeholder, "unbind", &args).map(|_| ())
    }

    fn call_plot(&self, method: &str, series_index: usize, data_index: usize) {
        let args = Array::of2(
            &JsValue::from_f64(series_index as f64),
            &JsValue::from_f64(data_index as f64),
        );

        if let Err(e) = call_method(&self.plot, method, &args) {
            log::warn!("plot.{method}({series_index}, {data_index}) failed: {e:?}");
        }
    }
}

impl ChartHost for JsChartHost {
    fn tooltip_options(&self) -> Option<TooltipOptions> {
        self.options.clone()
    }

    fn subscribe(&self, kind: EventKind) {
        {
            let mut subscriptions = self.subscriptions.borrow_mut();
            if subscriptions.contains(&kind) {
                return;
            }
            subscriptions.push(kind);
        }

        let handler = self.handler(kind);
        match self.bind(kind, handler.as_ref()) {
            Ok(()) => self.listeners.borrow_mut().push(Listener { kind, handler }),
            Err(e) => log::debug!(
                "Plot cannot deliver {} events, the page must forward them: {e:?}",
                kind.host_event_name()
            ),
        }
    }

    fn unsubscribe(&self, kind: EventKind) {
        self.subscriptions.borrow_mut().retain(|k| *k != kind);

        let listener = {
            let mut listeners = self.listeners.borrow_mut();
            listeners
                .iter()
                .position(|listener| listener.kind == kind)
                .map(|index| listeners.remove(index))
        };

        if let Some(listener) = listener {
            if let Err(e) = self.unbind(kind, listener.handler.as_ref()) {
                log::warn!("Cannot unbind {} handler: {e:?}", kind.host_event_name());
            }
            self.retired.borrow_mut().push(listener.handler);
        }
    }

    fn highlight(&self, series_index: usize, data_index: usize) {
        self.call_plot("highlight", series_index, data_index);
    }

    fn unhighlight(&self, series_index: usize, data_index: usize) {
        self.call_plot("unhighlight", series_index, data_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_event_names() {
        let names = host_event_names(&[EventKind::PointerMove, EventKind::Hover, EventKind::Click]);
        assert_eq!(names, vec!["mousemove", "plothover", "plotclick"]);
    }
}
