//! In-memory surface and host for running tooltips without a browser
//!
//! `HeadlessDocument` stands in for the page: containers hold element ids
//! and elements carry the content, classes, inline styles and visibility a
//! DOM node would. Several surfaces can share one document, the way several
//! charts share one page.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tooltip_shared::{
    EventKind, Position, Size, TooltipOptions, TooltipTheme, Viewport, TOOLTIP_CLASS,
};

use crate::host::{ChartHost, TooltipNode, TooltipSurface};

/// Snapshot of one tooltip element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessElement {
    pub id: String,
    pub container_id: String,
    pub content: String,
    pub position: Position,
    pub visible: bool,
    pub classes: Vec<String>,
    pub styles: Vec<(String, String)>,
}

impl HeadlessElement {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
pub struct HeadlessDocument {
    containers: BTreeMap<String, Vec<String>>,
    elements: HashMap<String, HeadlessElement>,
}

impl HeadlessDocument {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn contains_container(&self, container_id: &str) -> bool {
        self.containers.contains_key(container_id)
    }

    /// Ids of the elements currently attached to a container
    pub fn children(&self, container_id: &str) -> Vec<String> {
        self.containers.get(container_id).cloned().unwrap_or_default()
    }

    pub fn element(&self, id: &str) -> Option<&HeadlessElement> {
        self.elements.get(id)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Attached elements that are currently shown
    pub fn visible_elements(&self) -> Vec<&HeadlessElement> {
        let mut visible: Vec<&HeadlessElement> =
            self.elements.values().filter(|element| element.visible).collect();
        visible.sort_by(|a, b| a.id.cmp(&b.id));
        visible
    }

    fn update(&mut self, id: &str, f: impl FnOnce(&mut HeadlessElement)) {
        if let Some(element) = self.elements.get_mut(id) {
            f(element);
        }
    }
}

/// Surface backed by a [`HeadlessDocument`]
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    document: Rc<RefCell<HeadlessDocument>>,
    viewport: Viewport,
    node_size: Size,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_document(HeadlessDocument::shared(), viewport)
    }

    pub fn with_document(document: Rc<RefCell<HeadlessDocument>>, viewport: Viewport) -> Self {
        Self {
            document,
            viewport,
            node_size: Size::new(120.0, 24.0),
        }
    }

    /// Size every node reports as its outer size
    pub fn with_node_size(mut self, size: Size) -> Self {
        self.node_size = size;
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn document(&self) -> Rc<RefCell<HeadlessDocument>> {
        Rc::clone(&self.document)
    }
}

impl TooltipSurface for HeadlessSurface {
    type Node = HeadlessNode;

    fn ensure_container(&mut self, container_id: &str) {
        self.document
            .borrow_mut()
            .containers
            .entry(container_id.to_string())
            .or_default();
    }

    fn remove_container(&mut self, container_id: &str) {
        let mut document = self.document.borrow_mut();
        if let Some(children) = document.containers.remove(container_id) {
            for id in children {
                document.elements.remove(&id);
            }
        }
    }

    fn create_node(
        &mut self,
        container_id: &str,
        node_id: &str,
        theme: Option<&TooltipTheme>,
    ) -> Option<HeadlessNode> {
        let mut styles = theme.map(|t| t.declarations.clone()).unwrap_or_default();
        styles.push(("position".to_string(), "absolute".to_string()));

        let element = HeadlessElement {
            id: node_id.to_string(),
            container_id: container_id.to_string(),
            visible: true,
            classes: vec![TOOLTIP_CLASS.to_string()],
            styles,
            ..HeadlessElement::default()
        };

        let mut document = self.document.borrow_mut();
        document
            .containers
            .entry(container_id.to_string())
            .or_default()
            .push(node_id.to_string());
        document.elements.insert(node_id.to_string(), element);

        Some(HeadlessNode {
            document: Rc::clone(&self.document),
            id: node_id.to_string(),
            size: self.node_size,
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Handle to an element of a [`HeadlessDocument`]; operations on a detached
/// node are ignored
#[derive(Debug)]
pub struct HeadlessNode {
    document: Rc<RefCell<HeadlessDocument>>,
    id: String,
    size: Size,
}

impl HeadlessNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state of the element, `None` once detached
    pub fn snapshot(&self) -> Option<HeadlessElement> {
        self.document.borrow().element(&self.id).cloned()
    }

    fn update(&self, f: impl FnOnce(&mut HeadlessElement)) {
        self.document.borrow_mut().update(&self.id, f);
    }
}

impl TooltipNode for HeadlessNode {
    fn set_content(&mut self, html: &str) {
        self.update(|element| element.content = html.to_string());
    }

    fn move_to(&mut self, position: Position) {
        self.update(|element| element.position = position);
    }

    fn show(&mut self) {
        self.update(|element| element.visible = true);
    }

    fn hide(&mut self) {
        self.update(|element| element.visible = false);
    }

    fn add_class(&mut self, class: &str) {
        self.update(|element| {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&mut self, class: &str) {
        self.update(|element| element.classes.retain(|c| c != class));
    }

    fn outer_size(&self) -> Size {
        self.size
    }

    fn detach(&mut self) {
        let mut document = self.document.borrow_mut();
        if let Some(element) = document.elements.remove(&self.id) {
            if let Some(children) = document.containers.get_mut(&element.container_id) {
                children.retain(|id| id != &self.id);
            }
        }
    }
}

/// Command a [`RecordingHost`] received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Highlight(usize, usize),
    Unhighlight(usize, usize),
}

/// Chart host that records subscriptions and highlight commands
#[derive(Debug, Default)]
pub struct RecordingHost {
    options: Option<TooltipOptions>,
    subscriptions: RefCell<Vec<EventKind>>,
    commands: RefCell<Vec<HostCommand>>,
}

impl RecordingHost {
    pub fn new(options: Option<TooltipOptions>) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn subscriptions(&self) -> Vec<EventKind> {
        self.subscriptions.borrow().clone()
    }

    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.borrow().clone()
    }

    pub fn take_commands(&self) -> Vec<HostCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Points left highlighted after replaying every command
    pub fn highlighted(&self) -> Vec<(usize, usize)> {
        let mut highlighted = Vec::new();
        for command in self.commands.borrow().iter() {
            match *command {
                HostCommand::Highlight(series, index) => {
                    if !highlighted.contains(&(series, index)) {
                        highlighted.push((series, index));
                    }
                }
                HostCommand::Unhighlight(series, index) => {
                    highlighted.retain(|point| *point != (series, index));
                }
            }
        }
        highlighted
    }
}

impl ChartHost for RecordingHost {
    fn tooltip_options(&self) -> Option<TooltipOptions> {
        self.options.clone()
    }

    fn subscribe(&self, kind: EventKind) {
        let mut subscriptions = self.subscriptions.borrow_mut();
        if !subscriptions.contains(&kind) {
            subscriptions.push(kind);
        }
    }

    fn unsubscribe(&self, kind: EventKind) {
        self.subscriptions.borrow_mut().retain(|k| *k != kind);
    }

    fn highlight(&self, series_index: usize, data_index: usize) {
        self.commands
            .borrow_mut()
            .push(HostCommand::Highlight(series_index, data_index));
    }

    fn unhighlight(&self, series_index: usize, data_index: usize) {
        self.commands
            .borrow_mut()
            .push(HostCommand::Unhighlight(series_index, data_index));
    }
}
