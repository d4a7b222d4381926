//! In-memory host for native tests.
//!
//! Nodes are kept in a flat arena. Document order is insertion order, so test
//! fixtures add elements parent-first in the order they appear in markup.
//! Anchors prepended with [`Dom::prepend_anchor`] sort ahead of everything.
//!
//! Selector support covers what the components use: comma-separated lists of
//! compound selectors made of a tag, `#id`, `.class`, `[attr]`,
//! `[attr="value"]` and `:not(...)`. Combinators are not supported.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::UiError;
use crate::event::Timer;
use crate::host::{Dom, KeyValueStore, NodeId, Scheduler, Viewport};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeNode {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub position: i64,
    pub top: f64,
    pub height: f64,
    pub removed: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeHost {
    pub nodes: Vec<FakeNode>,
    next_position: i64,
    first_position: i64,
    html: Option<NodeId>,
    body: Option<NodeId>,
    pub active: Option<NodeId>,
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    pub scrolls: Vec<f64>,
    pub dark: bool,
    pub storage: BTreeMap<String, String>,
    pub storage_broken: bool,
    pub timers: Vec<(u32, Timer)>,
    pub frames_requested: usize,
    pub intersection_supported: bool,
    pub observed: BTreeSet<NodeId>,
}

impl FakeHost {
    /// A document with `<html>` and `<body>`.
    pub fn new() -> Self {
        let mut host = Self::without_root();
        let html = host.push(None, "html");
        let body = host.push(Some(html), "body");
        host.html = Some(html);
        host.body = Some(body);
        host
    }

    /// A document with neither `<html>` nor `<body>`.
    pub fn without_root() -> Self {
        Self {
            nodes: Vec::new(),
            next_position: 0,
            first_position: 0,
            html: None,
            body: None,
            active: None,
            scroll_y: 0.0,
            viewport_height: 800.0,
            document_height: 800.0,
            scrolls: Vec::new(),
            dark: false,
            storage: BTreeMap::new(),
            storage_broken: false,
            timers: Vec::new(),
            frames_requested: 0,
            intersection_supported: true,
            observed: BTreeSet::new(),
        }
    }

    fn push(&mut self, parent: Option<NodeId>, tag: &str) -> NodeId {
        let position = self.next_position;
        self.next_position += 1;
        self.nodes.push(FakeNode {
            tag: tag.to_ascii_uppercase(),
            parent,
            position,
            ..FakeNode::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Append an element under `parent` (the body when `None`).
    pub fn add(&mut self, parent: Option<NodeId>, tag: &str, id: Option<&str>, classes: &[&str]) -> NodeId {
        let parent = parent.or(self.body);
        let node = self.push(parent, tag);
        if let Some(id) = id {
            self.nodes[node.0].attrs.insert("id".to_owned(), id.to_owned());
        }
        for class in classes {
            self.nodes[node.0].classes.insert((*class).to_owned());
        }
        node
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0].attrs.insert(name.to_owned(), value.to_owned());
    }

    pub fn set_geometry(&mut self, node: NodeId, top: f64, height: f64) {
        self.nodes[node.0].top = top;
        self.nodes[node.0].height = height;
    }

    pub fn node(&self, node: NodeId) -> &FakeNode {
        &self.nodes[node.0]
    }

    pub fn html(&self) -> NodeId {
        self.html.unwrap_or(NodeId(usize::MAX))
    }

    pub fn body_id(&self) -> NodeId {
        self.body.unwrap_or(NodeId(usize::MAX))
    }

    /// Drain scheduled timers in the order they were requested.
    pub fn take_timers(&mut self) -> Vec<Timer> {
        self.timers.drain(..).map(|(_, timer)| timer).collect()
    }

    fn in_document_order(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> =
            (0..self.nodes.len()).map(NodeId).filter(|id| !self.nodes[id.0].removed).collect();
        ids.sort_by_key(|id| self.nodes[id.0].position);
        ids
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        selector
            .split(',')
            .map(parse_compound)
            .any(|compound| self.matches_compound(&self.nodes[node.0], &compound))
    }

    fn matches_compound(&self, node: &FakeNode, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        let ids_match = compound.ids.iter().all(|id| node.attrs.get("id") == Some(id));
        let classes_match = compound.classes.iter().all(|class| node.classes.contains(class));
        let attrs_match = compound.attrs.iter().all(|(name, value)| match value {
            Some(value) => node.attrs.get(name) == Some(value),
            None => node.attrs.contains_key(name),
        });
        let nots_match = compound.nots.iter().all(|not| !self.matches_compound(node, not));
        ids_match && classes_match && attrs_match && nots_match
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    nots: Vec<Compound>,
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(raw: &str) -> Compound {
    let mut compound = Compound::default();
    let mut rest = raw.trim();

    let tag_len = rest.find(|ch: char| !is_name_char(ch)).unwrap_or(rest.len());
    if tag_len > 0 {
        compound.tag = Some(rest[..tag_len].to_ascii_uppercase());
        rest = &rest[tag_len..];
    }

    while let Some(lead) = rest.chars().next() {
        match lead {
            '.' | '#' => {
                let body = &rest[1..];
                let len = body.find(|ch: char| !is_name_char(ch)).unwrap_or(body.len());
                let name = body[..len].to_owned();
                if lead == '.' {
                    compound.classes.push(name);
                } else {
                    compound.ids.push(name);
                }
                rest = &body[len..];
            }
            '[' => {
                let end = rest.find(']').unwrap_or(rest.len());
                let inner = &rest[1..end];
                match inner.split_once('=') {
                    Some((name, value)) => {
                        compound.attrs.push((name.to_owned(), Some(value.trim_matches('"').to_owned())));
                    }
                    None => compound.attrs.push((inner.to_owned(), None)),
                }
                rest = rest.get(end + 1..).unwrap_or("");
            }
            ':' => {
                let open = rest.find('(').unwrap_or(rest.len());
                let close = rest.find(')').unwrap_or(rest.len());
                if let Some(inner) = rest.get(open + 1..close) {
                    compound.nots.push(parse_compound(inner));
                }
                rest = rest.get(close + 1..).unwrap_or("");
            }
            _ => break,
        }
    }
    compound
}

impl Dom for FakeHost {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.in_document_order()
            .into_iter()
            .find(|node| self.nodes[node.0].attrs.get("id").map(String::as_str) == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.in_document_order().into_iter().filter(|node| self.matches(*node, selector)).collect()
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        self.in_document_order()
            .into_iter()
            .filter(|node| *node != root && self.contains(root, *node) && self.matches(*node, selector))
            .collect()
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current.0).and_then(|n| n.parent);
        }
        false
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.nodes[node.0].tag.clone()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attrs.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.set_attr(node, name, value);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.contains(class)
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        let classes = &mut self.nodes[node.0].classes;
        if on {
            classes.insert(class.to_owned());
        } else {
            classes.remove(class);
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.nodes[node.0].text.clone()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = Some(text.to_owned());
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let style = &mut self.nodes[node.0].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_owned(), value.to_owned());
        }
    }

    fn style(&self, node: NodeId, property: &str) -> String {
        self.nodes[node.0].style.get(property).cloned().unwrap_or_default()
    }

    fn document_element(&self) -> Option<NodeId> {
        self.html
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn prepend_anchor(&mut self, parent: NodeId, href: &str, text: &str, class: &str) -> Option<NodeId> {
        let node = self.push(Some(parent), "a");
        self.first_position -= 1;
        self.nodes[node.0].position = self.first_position;
        self.set_attr(node, "href", href);
        self.nodes[node.0].classes.insert(class.to_owned());
        self.nodes[node.0].text = Some(text.to_owned());
        Some(node)
    }

    fn remove(&mut self, node: NodeId) {
        self.nodes[node.0].removed = true;
    }

    fn focus(&mut self, node: NodeId) {
        self.active = Some(node);
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.nodes[node.0].top
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0].height
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        self.nodes[node.0].top - self.scroll_y
    }

    fn supports_intersection_observer(&self) -> bool {
        self.intersection_supported
    }

    fn observe_intersection(&mut self, node: NodeId) -> bool {
        if !self.intersection_supported {
            return false;
        }
        self.observed.insert(node);
        true
    }

    fn unobserve_intersection(&mut self, node: NodeId) {
        self.observed.remove(&node);
    }
}

impl Viewport for FakeHost {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn scroll_to(&mut self, top: f64) {
        self.scrolls.push(top);
        self.scroll_y = top.max(0.0);
    }

    fn prefers_dark(&self) -> bool {
        self.dark
    }
}

impl KeyValueStore for FakeHost {
    fn get(&self, key: &str) -> Result<Option<String>, UiError> {
        if self.storage_broken {
            return Err(UiError::StorageUnavailable);
        }
        Ok(self.storage.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError> {
        if self.storage_broken {
            return Err(UiError::StorageUnavailable);
        }
        self.storage.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl Scheduler for FakeHost {
    fn set_timeout(&mut self, delay_ms: u32, timer: Timer) {
        self.timers.push((delay_ms, timer));
    }

    fn request_frame(&mut self) {
        self.frames_requested += 1;
    }
}

/// Handles into the standard portfolio fixture built by [`portfolio`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Page {
    pub navbar: NodeId,
    pub toggle: NodeId,
    pub icon: NodeId,
    pub hamburger: NodeId,
    pub menu: NodeId,
    pub links: [NodeId; 3],
    pub main: NodeId,
    pub sections: [NodeId; 3],
}

/// A page with a nav bar (80px), a theme toggle, a hamburger, a three-link
/// menu and sections `about` (0, 500), `work` (500, 800) and
/// `contact` (1300, 400). Viewport 800px, document 1700px.
pub(crate) fn portfolio() -> (FakeHost, Page) {
    let mut host = FakeHost::new();
    let navbar = host.add(None, "nav", None, &["navbar"]);
    host.set_geometry(navbar, 0.0, 80.0);
    let toggle = host.add(Some(navbar), "button", Some("theme-toggle"), &[]);
    let icon = host.add(Some(toggle), "span", None, &["theme-icon"]);
    let hamburger = host.add(Some(navbar), "button", Some("hamburger"), &[]);
    let menu = host.add(Some(navbar), "ul", Some("nav-menu"), &[]);
    let mut links = [NodeId(0); 3];
    for (slot, id) in links.iter_mut().zip(["about", "work", "contact"]) {
        let item = host.add(Some(menu), "li", None, &[]);
        let link = host.add(Some(item), "a", None, &["nav-link"]);
        host.set_attr(link, "href", &format!("#{id}"));
        *slot = link;
    }
    let main = host.add(None, "main", None, &[]);
    let mut sections = [NodeId(0); 3];
    for (slot, (id, top, height)) in
        sections.iter_mut().zip([("about", 0.0, 500.0), ("work", 500.0, 800.0), ("contact", 1300.0, 400.0)])
    {
        let section = host.add(Some(main), "section", Some(id), &[]);
        host.set_geometry(section, top, height);
        *slot = section;
    }
    host.viewport_height = 800.0;
    host.document_height = 1700.0;
    let page = Page { navbar, toggle, icon, hamburger, menu, links, main, sections };
    (host, page)
}
