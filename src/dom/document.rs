//! Document - element arena, attributes, classes, styles, queries.
//!
//! The behaviors never hold element references. They keep `ElementId`s and
//! go through the document for every read and write, so an element that was
//! detached simply stops matching queries.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::trace;

use crate::error::{Error, Result};
use crate::types::{format_number, ClassList, ElementId, Style};

// =============================================================================
// Element
// =============================================================================

/// A single element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    classes: ClassList,
    style: Style,
    title: Option<String>,
    offset_width: f64,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: ClassList::NONE,
            style: Style::default(),
            title: None,
            offset_width: 0.0,
        }
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn classes(&self) -> ClassList {
        self.classes
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Window metrics the behaviors read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Window inner width in px, scrollbar included.
    pub inner_width: f64,
    /// Vertical scroll offset in px.
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            inner_width: 1024.0,
            scroll_y: 0.0,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// In-memory page: a root `html` element with a `body` child.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
    body: ElementId,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            elements: vec![Element::new("html")],
            root: ElementId(0),
            body: ElementId(0),
            viewport: Viewport::default(),
        };
        let body = doc.create_element("body");
        doc.attach(doc.root, body);
        doc.body = body;
        // No scrollbar until the host says otherwise.
        doc.set_offset_width(body, doc.viewport.inner_width);
        doc
    }

    /// The `html` element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The `body` element.
    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.index())
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    ///
    /// `child` may not be `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if self.element(parent).is_none() {
            return Err(Error::UnknownElement(parent));
        }
        if self.element(child).is_none() {
            return Err(Error::UnknownElement(child));
        }
        if self.ancestors_inclusive(parent).any(|a| a == child) {
            return Err(Error::HierarchyRequest { parent, child });
        }
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: ElementId, tag: &str) -> Result<ElementId> {
        let child = self.create_element(tag);
        self.append_child(parent, child)?;
        Ok(child)
    }

    /// Detach an element from its parent. Its subtree stays intact.
    pub fn remove(&mut self, id: ElementId) {
        self.detach(id);
    }

    fn attach(&mut self, parent: ElementId, child: ElementId) {
        self.elements[parent.index()].children.push(child);
        self.elements[child.index()].parent = Some(parent);
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.element(id).and_then(Element::parent) else {
            return;
        };
        self.elements[parent.index()].children.retain(|c| *c != id);
        self.elements[id.index()].parent = None;
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(Element::parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.element(id).map(Element::children).unwrap_or(&[])
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    /// `id`, then its parent, then the parent's parent...
    pub fn ancestors_inclusive(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        let start = self.element(id).map(|_| id);
        std::iter::successors(start, move |current| self.parent(*current))
    }

    /// Nearest inclusive ancestor matching `predicate`.
    pub fn closest<F>(&self, id: ElementId, predicate: F) -> Option<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        self.ancestors_inclusive(id)
            .find(|a| self.element(*a).is_some_and(&predicate))
    }

    /// All descendants of `id` in document order (pre-order), excluding `id`.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every connected element matching `predicate`, in document order.
    pub fn query_all<F>(&self, predicate: F) -> Vec<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|id| self.element(*id).is_some_and(&predicate))
            .collect()
    }

    /// Connected elements carrying `attribute`.
    pub fn query_all_with_attribute(&self, attribute: &str) -> Vec<ElementId> {
        self.query_all(|el| el.attribute(attribute).is_some())
    }

    /// Descendants of `scope` carrying every class in `classes`.
    pub fn query_classes_within(&self, scope: ElementId, classes: ClassList) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.has_class(*id, classes))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    pub fn get_attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attribute(name))
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute. `class` is parsed into the class list.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            trace!("set_attribute on missing element {id}");
            return;
        };
        if name == "class" {
            el.classes = ClassList::parse(value);
        } else {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attributes.remove(name);
        }
    }

    /// Toggle a boolean attribute. Returns whether it is now present.
    pub fn toggle_attribute(&mut self, id: ElementId, name: &str) -> bool {
        if self.has_attribute(id, name) {
            self.remove_attribute(id, name);
            false
        } else {
            self.set_attribute(id, name, "");
            self.has_attribute(id, name)
        }
    }

    // -------------------------------------------------------------------------
    // Classes
    // -------------------------------------------------------------------------

    pub fn classes(&self, id: ElementId) -> ClassList {
        self.element(id).map(Element::classes).unwrap_or_default()
    }

    pub fn has_class(&self, id: ElementId, classes: ClassList) -> bool {
        self.classes(id).contains(classes)
    }

    pub fn add_class(&mut self, id: ElementId, classes: ClassList) {
        if let Some(el) = self.element_mut(id) {
            el.classes.insert(classes);
        }
    }

    pub fn remove_class(&mut self, id: ElementId, classes: ClassList) {
        if let Some(el) = self.element_mut(id) {
            el.classes.remove(classes);
        }
    }

    // -------------------------------------------------------------------------
    // Style, title, layout
    // -------------------------------------------------------------------------

    pub fn style(&self, id: ElementId) -> Style {
        self.element(id).map(Element::style).unwrap_or_default()
    }

    pub fn set_padding_right(&mut self, id: ElementId, px: Option<f64>) {
        if let Some(el) = self.element_mut(id) {
            el.style.padding_right = px;
        }
    }

    pub fn set_width_percent(&mut self, id: ElementId, percent: Option<f64>) {
        if let Some(el) = self.element_mut(id) {
            el.style.width_percent = percent;
        }
    }

    pub fn title(&self, id: ElementId) -> Option<&str> {
        self.element(id).and_then(Element::title)
    }

    pub fn set_title(&mut self, id: ElementId, title: &str) {
        if let Some(el) = self.element_mut(id) {
            el.title = Some(title.to_string());
        }
    }

    /// Laid-out width in px (`offsetWidth`).
    pub fn offset_width(&self, id: ElementId) -> f64 {
        self.element(id).map(|el| el.offset_width).unwrap_or(0.0)
    }

    pub fn set_offset_width(&mut self, id: ElementId, px: f64) {
        if let Some(el) = self.element_mut(id) {
            el.offset_width = px;
        }
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Markup for `id` and its subtree. Attributes are sorted by name.
    pub fn outer_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: ElementId, out: &mut String) {
        let Some(el) = self.element(id) else {
            return;
        };
        let _ = write!(out, "<{}", el.tag);
        if !el.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", el.classes.to_class_string());
        }
        for (name, value) in &el.attributes {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
            }
        }
        let mut style = Vec::new();
        if let Some(px) = el.style.padding_right {
            style.push(format!("padding-right:{}px", format_number(px)));
        }
        if let Some(percent) = el.style.width_percent {
            style.push(format!("width:{}%", format_number(percent)));
        }
        if !style.is_empty() {
            let _ = write!(out, " style=\"{}\"", style.join(";"));
        }
        if let Some(title) = &el.title {
            let _ = write!(out, " title=\"{}\"", escape_attribute(title));
        }
        out.push('>');
        if el.tag == "input" {
            return;
        }
        for child in &el.children {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

/// Escape an attribute value for a double-quoted attribute.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Document {
        Document::new()
    }

    #[test]
    fn test_new_document_has_root_and_body() {
        let doc = setup();
        assert_eq!(doc.tag(doc.root()), Some("html"));
        assert_eq!(doc.tag(doc.body()), Some("body"));
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert_eq!(doc.offset_width(doc.body()), doc.viewport().inner_width);
    }

    #[test]
    fn test_append_and_remove() {
        let mut doc = setup();
        let body = doc.body();
        let div = doc.append_new(body, "div").unwrap();
        let span = doc.append_new(div, "span").unwrap();

        assert_eq!(doc.descendants(body), vec![div, span]);

        doc.remove(span);
        assert_eq!(doc.parent(span), None);
        assert!(doc.children(div).is_empty());
    }

    #[test]
    fn test_append_into_self_is_rejected() {
        let mut doc = setup();
        let body = doc.body();
        let a = doc.append_new(body, "div").unwrap();

        assert_eq!(
            doc.append_child(a, a),
            Err(Error::HierarchyRequest { parent: a, child: a })
        );
        assert_eq!(doc.parent(a), Some(body));
        assert!(doc.children(a).is_empty());
    }

    #[test]
    fn test_append_ancestor_into_descendant_is_rejected() {
        let mut doc = setup();
        let body = doc.body();
        let a = doc.append_new(body, "div").unwrap();
        let b = doc.append_new(a, "div").unwrap();

        assert_eq!(
            doc.append_child(b, a),
            Err(Error::HierarchyRequest { parent: b, child: a })
        );
        // Tree is untouched and still walkable.
        assert_eq!(doc.parent(a), Some(body));
        assert_eq!(doc.descendants(a), vec![b]);
        assert_eq!(doc.ancestors_inclusive(b).collect::<Vec<_>>(), vec![b, a, body, doc.root()]);
    }

    #[test]
    fn test_append_unknown_element() {
        let mut doc = setup();
        let bogus = ElementId(99);
        assert_eq!(
            doc.append_child(doc.body(), bogus),
            Err(Error::UnknownElement(bogus))
        );
    }

    #[test]
    fn test_append_moves_child() {
        let mut doc = setup();
        let body = doc.body();
        let a = doc.append_new(body, "div").unwrap();
        let b = doc.append_new(body, "div").unwrap();
        let c = doc.append_new(a, "p").unwrap();

        doc.append_child(b, c).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[c]);
    }

    #[test]
    fn test_query_document_order() {
        let mut doc = setup();
        let body = doc.body();
        let a = doc.append_new(body, "div").unwrap();
        let a1 = doc.append_new(a, "div").unwrap();
        let b = doc.append_new(body, "div").unwrap();
        for id in [b, a1, a] {
            doc.set_attribute(id, "data-x", "");
        }
        assert_eq!(doc.query_all_with_attribute("data-x"), vec![a, a1, b]);
    }

    #[test]
    fn test_query_skips_detached() {
        let mut doc = setup();
        let loose = doc.create_element("div");
        doc.set_attribute(loose, "data-x", "");
        assert!(doc.query_all_with_attribute("data-x").is_empty());
    }

    #[test]
    fn test_closest_is_inclusive() {
        let mut doc = setup();
        let body = doc.body();
        let outer = doc.append_new(body, "div").unwrap();
        let inner = doc.append_new(outer, "span").unwrap();
        doc.set_attribute(outer, "data-menu", "");

        let is_menu = |el: &Element| el.attribute("data-menu").is_some();
        assert_eq!(doc.closest(inner, is_menu), Some(outer));
        assert_eq!(doc.closest(outer, is_menu), Some(outer));
        assert_eq!(doc.closest(body, is_menu), None);
    }

    #[test]
    fn test_toggle_attribute() {
        let mut doc = setup();
        let root = doc.root();
        assert!(doc.toggle_attribute(root, "data-open"));
        assert!(doc.has_attribute(root, "data-open"));
        assert!(!doc.toggle_attribute(root, "data-open"));
        assert!(!doc.has_attribute(root, "data-open"));
    }

    #[test]
    fn test_class_attribute_is_parsed() {
        let mut doc = setup();
        let body = doc.body();
        let el = doc.append_new(body, "div").unwrap();
        doc.set_attribute(el, "class", "rating__item other");
        assert!(doc.has_class(el, ClassList::RATING_ITEM));
        assert_eq!(doc.get_attribute(el, "class"), None);
    }

    #[test]
    fn test_outer_html() {
        let mut doc = setup();
        let body = doc.body();
        let label = doc.append_new(body, "label").unwrap();
        doc.add_class(label, ClassList::RATING_ITEM);
        let input = doc.append_new(label, "input").unwrap();
        doc.set_attribute(input, "value", "1");
        let span = doc.append_new(label, "span").unwrap();
        doc.set_width_percent(span, Some(50.0));

        assert_eq!(
            doc.outer_html(label),
            "<label class=\"rating__item\"><input value=\"1\"><span style=\"width:50%\"></span></label>"
        );
    }

    #[test]
    fn test_outer_html_escapes_values() {
        let mut doc = setup();
        let body = doc.body();
        let link = doc.append_new(body, "link").unwrap();
        doc.set_attribute(link, "href", "/a.js?x=\"1\"&y=<2>");
        doc.set_title(link, "a \"b\"");

        assert_eq!(
            doc.outer_html(link),
            "<link href=\"/a.js?x=&quot;1&quot;&amp;y=&lt;2>\" title=\"a &quot;b&quot;\"></link>"
        );
    }

    #[test]
    fn test_missing_element_is_noop() {
        let mut doc = setup();
        let bogus = ElementId(42);
        doc.set_attribute(bogus, "a", "b");
        doc.add_class(bogus, ClassList::RATING_ITEM);
        doc.set_padding_right(bogus, Some(1.0));
        assert_eq!(doc.get_attribute(bogus, "a"), None);
        assert_eq!(doc.classes(bogus), ClassList::NONE);
        assert_eq!(doc.style(bogus), Style::default());
    }
}
