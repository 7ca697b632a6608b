//! Browser DOM implementation of the tooltip surface
//!
//! Tooltips are `<div class="flotTip">` elements inside a shared
//! `<div id="flotTips">` appended to `document.body`. DOM failures are
//! logged and otherwise ignored.

use tooltip_engine::{Position, Size, TooltipNode, TooltipSurface, TooltipTheme, Viewport, TOOLTIP_CLASS};
use tooltip_shared::{TooltipError, TooltipResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, Window};

fn log_failure(operation: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("Tooltip DOM {operation} failed: {e:?}");
    }
}

pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}

pub struct DomSurface {
    window: Window,
    document: Document,
}

impl DomSurface {
    pub fn from_window() -> TooltipResult<Self> {
        let window = web_sys::window().ok_or_else(|| TooltipError::JsInterop {
            message: "No global window".to_string(),
        })?;
        let document = window.document().ok_or_else(|| TooltipError::JsInterop {
            message: "Window has no document".to_string(),
        })?;
        Ok(Self { window, document })
    }

    fn window_metric(&self, value: Result<JsValue, JsValue>) -> f64 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }
}

impl TooltipSurface for DomSurface {
    type Node = DomNode;

    fn ensure_container(&mut self, container_id: &str) {
        if self.document.get_element_by_id(container_id).is_some() {
            return;
        }

        let Some(body) = self.document.body() else {
            log::warn!("Document has no body for tooltip container {container_id}");
            return;
        };

        match self.document.create_element("div") {
            Ok(container) => {
                container.set_id(container_id);
                log_failure("append container", body.append_child(&container).map(|_| ()));
            }
            Err(e) => log::warn!("Cannot create tooltip container {container_id}: {e:?}"),
        }
    }

    fn remove_container(&mut self, container_id: &str) {
        if let Some(container) = self.document.get_element_by_id(container_id) {
            container.remove();
        }
    }

    fn create_node(
        &mut self,
        container_id: &str,
        node_id: &str,
        theme: Option<&TooltipTheme>,
    ) -> Option<DomNode> {
        let container = self.document.get_element_by_id(container_id)?;
        let element: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;

        element.set_id(node_id);
        element.set_class_name(TOOLTIP_CLASS);

        let style = element.style();
        if let Some(theme) = theme {
            style.set_css_text(&theme.css_text());
        }
        log_failure("style", style.set_property("position", "absolute"));

        container.append_child(&element).ok()?;
        Some(DomNode { element })
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_x: self.window.scroll_x().unwrap_or(0.0),
            scroll_y: self.window.scroll_y().unwrap_or(0.0),
            inner_width: self.window_metric(self.window.inner_width()),
            inner_height: self.window_metric(self.window.inner_height()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomNode {
    element: HtmlElement,
}

impl DomNode {
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn set_style(&self, property: &str, value: &str) {
        log_failure("style", self.element.style().set_property(property, value));
    }
}

impl TooltipNode for DomNode {
    fn set_content(&mut self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn move_to(&mut self, position: Position) {
        self.set_style("left", &px(position.x));
        self.set_style("top", &px(position.y));
    }

    fn show(&mut self) {
        self.set_style("display", "block");
    }

    fn hide(&mut self) {
        self.set_style("display", "none");
    }

    fn add_class(&mut self, class: &str) {
        log_failure("add class", self.element.class_list().add_1(class));
    }

    fn remove_class(&mut self, class: &str) {
        log_failure("remove class", self.element.class_list().remove_1(class));
    }

    fn outer_size(&self) -> Size {
        Size::new(
            f64::from(self.element.offset_width()),
            f64::from(self.element.offset_height()),
        )
    }

    fn detach(&mut self) {
        self.element.remove();
    }
}
