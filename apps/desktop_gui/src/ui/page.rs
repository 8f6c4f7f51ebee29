//! Retained page model: element tree addressed by id/class/href, plus the side-effect
//! queues (alerts, scrolls, picker requests) the shell drains every frame.

use std::collections::{HashMap, VecDeque};

use shared::domain::{Category, HexColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Root,
    Nav,
    Anchor,
    Section,
    Heading,
    Paragraph,
    Button,
    FileInput,
    Spinner,
    Badge,
    Image,
    List,
    ListItem,
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Smooth scroll that aligns the target's top edge with the viewport top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: NodeId,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub href: Option<String>,
    pub text: String,
    pub display: Display,
    pub background: Option<HexColor>,
    pub src: Option<String>,
    pub translate_y: f32,
    src_revision: u64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            href: None,
            text: String::new(),
            display: Display::Block,
            background: None,
            src: None,
            translate_y: 0.0,
            src_revision: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_background(mut self, color: HexColor) -> Self {
        self.background = Some(color);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.display = Display::None;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_visible(&self) -> bool {
        self.display == Display::Block
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Bumped on every `set_src`, so renderers can cache per source without comparing payloads.
    pub fn src_revision(&self) -> u64 {
        self.src_revision
    }
}

/// Slots freed by `clear_children` are reused, so ids of removed elements must not be kept.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    free: Vec<usize>,
    ids: HashMap<String, NodeId>,
    src_revision: u64,
    root: NodeId,
    alerts: VecDeque<String>,
    scroll_requests: VecDeque<ScrollRequest>,
    picker_requests: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Element::new(Tag::Root))],
            free: Vec::new(),
            ids: HashMap::new(),
            src_revision: 0,
            root: NodeId(0),
            alerts: VecDeque::new(),
            scroll_requests: VecDeque::new(),
            picker_requests: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    pub fn append_child(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        element.parent = Some(parent);
        let node = match self.free.pop() {
            Some(slot) => NodeId(slot),
            None => {
                self.nodes.push(None);
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(id) = &element.id {
            self.ids.entry(id.clone()).or_insert(node);
        }
        self.nodes[node.0] = Some(element);
        if let Some(parent) = self.element_mut(parent) {
            parent.children.push(node);
        }
        node
    }

    /// Detaches and drops every descendant of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let Some(children) = self.element_mut(node).map(|el| std::mem::take(&mut el.children))
        else {
            return;
        };
        let mut stack = children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.get_mut(child.0).and_then(Option::take) {
                if let Some(id) = &removed.id {
                    if self.ids.get(id) == Some(&child) {
                        self.ids.remove(id);
                    }
                }
                self.free.push(child.0);
                stack.extend(removed.children);
            }
        }
    }

    fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &Element)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, el)| el.as_ref().map(|el| (NodeId(idx), el)))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|(_, el)| el.has_class(class))
            .map(|(node, _)| node)
            .collect()
    }

    /// Anchors whose `href` starts with `#`.
    pub fn hash_anchors(&self) -> Vec<NodeId> {
        self.live_nodes()
            .filter(|(_, el)| {
                el.tag == Tag::Anchor && el.href.as_deref().is_some_and(|h| h.starts_with('#'))
            })
            .map(|(node, _)| node)
            .collect()
    }

    /// Resolves `#id` selectors; anything else matches nothing.
    pub fn query_selector_href(&self, href: &str) -> Option<NodeId> {
        let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
        self.get_element_by_id(id)
    }

    /// Target first, then each ancestor up to the root.
    pub fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.element(target).map(|_| target);
        while let Some(node) = current {
            path.push(node);
            current = self.element(node).and_then(Element::parent);
        }
        path
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.text = text.into();
        }
    }

    pub fn set_display(&mut self, node: NodeId, display: Display) {
        if let Some(el) = self.element_mut(node) {
            el.display = display;
        }
    }

    pub fn set_background(&mut self, node: NodeId, color: HexColor) {
        if let Some(el) = self.element_mut(node) {
            el.background = Some(color);
        }
    }

    pub fn set_src(&mut self, node: NodeId, src: impl Into<String>) {
        let revision = self.src_revision + 1;
        if let Some(el) = self.element_mut(node) {
            el.src = Some(src.into());
            el.src_revision = revision;
            self.src_revision = revision;
        }
    }

    pub fn set_translate_y(&mut self, node: NodeId, offset: f32) {
        if let Some(el) = self.element_mut(node) {
            el.translate_y = offset;
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(Element::is_visible)
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.text.as_str())
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push_back(message.into());
    }

    pub fn front_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn dismiss_alert(&mut self) -> Option<String> {
        self.alerts.pop_front()
    }

    pub fn scroll_into_view(&mut self, target: NodeId) {
        self.scroll_requests.push_back(ScrollRequest { target });
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll_requests.pop_front()
    }

    pub fn request_file_picker(&mut self) {
        self.picker_requests += 1;
    }

    /// Returns how many picker opens were requested since the last call.
    pub fn take_picker_requests(&mut self) -> u32 {
        std::mem::take(&mut self.picker_requests)
    }

    /// The EcoSort landing page: navigation, upload area, results panel, category cards.
    pub fn index_page() -> Self {
        let mut doc = Self::new();
        let root = doc.root();

        let nav = doc.append_child(root, Element::new(Tag::Nav));
        for (href, label) in [
            ("#upload", "Classify"),
            ("#categories", "Categories"),
            ("#about", "About"),
        ] {
            doc.append_child(nav, Element::new(Tag::Anchor).with_href(href).with_text(label));
        }

        let upload = doc.append_child(root, Element::new(Tag::Section).with_id("upload"));
        doc.append_child(
            upload,
            Element::new(Tag::Heading).with_text("Identify your waste"),
        );
        let upload_area = doc.append_child(
            upload,
            Element::new(Tag::Section)
                .with_id("upload-area")
                .with_class("upload-area"),
        );
        doc.append_child(
            upload_area,
            Element::new(Tag::Paragraph)
                .with_text("Click or drop an image here (PNG, JPG, JPEG or GIF, up to 10MB)"),
        );
        doc.append_child(
            upload_area,
            Element::new(Tag::Button)
                .with_id("upload-btn")
                .with_text("Choose Image"),
        );
        doc.append_child(
            upload_area,
            Element::new(Tag::FileInput).with_id("file-input").hidden(),
        );
        doc.append_child(
            upload,
            Element::new(Tag::Spinner)
                .with_id("loading")
                .with_text("Analyzing image...")
                .hidden(),
        );

        let results = doc.append_child(
            root,
            Element::new(Tag::Section).with_id("results-section").hidden(),
        );
        doc.append_child(results, Element::new(Tag::Heading).with_text("Classification Result"));
        doc.append_child(results, Element::new(Tag::Image).with_id("result-image"));
        doc.append_child(results, Element::new(Tag::Badge).with_id("category-badge"));
        doc.append_child(results, Element::new(Tag::Paragraph).with_id("confidence"));
        doc.append_child(results, Element::new(Tag::Heading).with_text("How to recycle"));
        doc.append_child(
            results,
            Element::new(Tag::Paragraph).with_id("recycling-description"),
        );
        doc.append_child(results, Element::new(Tag::List).with_id("recycling-tips"));

        let categories = doc.append_child(root, Element::new(Tag::Section).with_id("categories"));
        doc.append_child(categories, Element::new(Tag::Heading).with_text("Waste Categories"));
        for category in Category::ALL {
            doc.append_child(
                categories,
                Element::new(Tag::Card)
                    .with_class("category-card")
                    .with_text(category.label())
                    .with_background(category.color()),
            );
        }

        let about = doc.append_child(root, Element::new(Tag::Section).with_id("about"));
        doc.append_child(about, Element::new(Tag::Heading).with_text("About EcoSort"));
        doc.append_child(
            about,
            Element::new(Tag::Paragraph).with_text(
                "Upload a photo of an item and get its waste category with recycling guidance.",
            ),
        );

        doc
    }
}
