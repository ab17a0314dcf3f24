#![forbid(unsafe_code)]

//! Live document adapter.
//!
//! [`RenderSurface`] is the narrow slice of a DOM that column blocks need:
//! element creation, classes, attributes, inline style properties, measured
//! widths, root variables, the body cursor class, and id-addressed style
//! rules. Operations on unknown elements are silently ignored, the way a
//! failed selector lookup is.
//!
//! [`MemorySurface`] implements the trait in memory for hosts without a DOM
//! and for tests.

use std::collections::{BTreeMap, HashMap};

use mcol_core::ElementId;
use mcol_style::{ColumnWidth, vars};

/// Host document operations used by rendering, resizing, and sessions.
pub trait RenderSurface {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> ElementId;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Remove an element and its subtree.
    fn remove_element(&mut self, element: ElementId);

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Add or remove `class` depending on `on`.
    fn toggle_class(&mut self, element: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }

    /// Set an inline style property (a CSS property or a custom property).
    fn set_style_property(&mut self, element: ElementId, name: &str, value: &str);

    /// Current value of an inline style property.
    fn style_property(&self, element: ElementId, name: &str) -> Option<String>;

    /// Drop every inline style of an element.
    fn clear_inline_styles(&mut self, element: ElementId);

    /// Replace the text content of an element.
    fn set_text(&mut self, element: ElementId, text: &str);

    /// Rendered width in layout pixels.
    fn measured_width(&self, element: ElementId) -> f64;

    /// Set a variable on the document root.
    fn set_root_property(&mut self, name: &str, value: &str);

    /// Add or remove a class on the document body.
    fn set_body_class(&mut self, class: &str, on: bool);

    /// Take one hold on a body class; it stays on while any hold remains.
    fn hold_body_class(&mut self, class: &str);

    /// Drop one hold taken with [`RenderSurface::hold_body_class`].
    fn release_body_class(&mut self, class: &str);

    /// Insert or replace the style rule with id `rule_id`.
    fn upsert_style_rule(&mut self, rule_id: &str, css: &str);

    /// Remove the style rule with id `rule_id`, if any.
    fn remove_style_rule(&mut self, rule_id: &str);
}

/// One element of a [`MemorySurface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryElement {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    width: Option<f64>,
}

impl MemoryElement {
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Classes in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    /// Inline styles by property name.
    #[must_use]
    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// In-memory [`RenderSurface`].
///
/// Layout is approximated: an element whose width style (`width` or the
/// column width variable) is a percentage measures that share of its
/// parent's measured width. Otherwise it measures whatever
/// [`MemorySurface::set_measured_width`] assigned, else it fills its parent
/// like a block element. Detached elements without a width measure 0.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: HashMap<ElementId, MemoryElement>,
    next_id: u64,
    root_properties: BTreeMap<String, String>,
    /// Body classes with their hold counts.
    body_classes: BTreeMap<String, usize>,
    style_rules: BTreeMap<String, String>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached host element with a fixed width, ready to receive a
    /// rendered block.
    pub fn create_host(&mut self, width: f64) -> ElementId {
        let host = self.create_element("div");
        self.set_measured_width(host, width);
        host
    }

    /// Fix the width an element measures when its styles do not determine it.
    pub fn set_measured_width(&mut self, element: ElementId, width: f64) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.width = Some(width);
        }
    }

    #[must_use]
    pub fn element(&self, element: ElementId) -> Option<&MemoryElement> {
        self.elements.get(&element)
    }

    /// Whether the element still exists.
    #[must_use]
    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    /// Number of live elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.contains_key(class)
    }

    #[must_use]
    pub fn style_rule(&self, rule_id: &str) -> Option<&str> {
        self.style_rules.get(rule_id).map(String::as_str)
    }

    /// Number of installed style rules.
    #[must_use]
    pub fn style_rule_count(&self) -> usize {
        self.style_rules.len()
    }

    fn percent_width(node: &MemoryElement) -> Option<f64> {
        ["width", vars::COLUMN_WIDTH]
            .into_iter()
            .filter_map(|name| node.styles.get(name))
            .find_map(|raw| ColumnWidth::parse(raw).percent())
    }

    fn detach(&mut self, child: ElementId) {
        let parent = self.elements.get_mut(&child).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|c| *c != child);
        }
    }

    /// Whether `candidate` is `element` or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: ElementId, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            if id == candidate {
                return true;
            }
            cursor = self.elements.get(&id).and_then(|node| node.parent);
        }
        false
    }
}

impl RenderSurface for MemorySurface {
    fn create_element(&mut self, tag: &str) -> ElementId {
        self.next_id += 1;
        let id = ElementId::new(self.next_id);
        self.elements.insert(
            id,
            MemoryElement {
                tag: tag.to_string(),
                ..MemoryElement::default()
            },
        );
        id
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.contains(parent)
            || !self.contains(child)
            || self.is_ancestor_or_self(child, parent)
        {
            return;
        }
        self.detach(child);
        if let Some(node) = self.elements.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.elements.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn remove_element(&mut self, element: ElementId) {
        self.detach(element);
        let mut pending = vec![element];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.elements.remove(&id) {
                pending.extend(node.children);
            }
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.elements.get_mut(&element) {
            if !node.has_class(class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn set_style_property(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.styles.insert(name.to_string(), value.to_string());
        }
    }

    fn style_property(&self, element: ElementId, name: &str) -> Option<String> {
        self.elements.get(&element)?.styles.get(name).cloned()
    }

    fn clear_inline_styles(&mut self, element: ElementId) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.styles.clear();
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(node) = self.elements.get_mut(&element) {
            node.text = text.to_string();
        }
    }

    fn measured_width(&self, element: ElementId) -> f64 {
        let Some(node) = self.elements.get(&element) else {
            return 0.0;
        };
        let from_parent = Self::percent_width(node).zip(node.parent).map(|(percent, parent)| {
            percent * self.measured_width(parent) / 100.0
        });
        match (from_parent, node.width) {
            (Some(width), _) if width > 0.0 => width,
            (_, Some(width)) => width,
            _ => node.parent.map_or(0.0, |parent| self.measured_width(parent)),
        }
    }

    fn set_root_property(&mut self, name: &str, value: &str) {
        self.root_properties
            .insert(name.to_string(), value.to_string());
    }

    fn set_body_class(&mut self, class: &str, on: bool) {
        if on {
            let holds = self.body_classes.entry(class.to_string()).or_default();
            *holds = (*holds).max(1);
        } else {
            self.body_classes.remove(class);
        }
    }

    fn hold_body_class(&mut self, class: &str) {
        *self.body_classes.entry(class.to_string()).or_default() += 1;
    }

    fn release_body_class(&mut self, class: &str) {
        if let Some(holds) = self.body_classes.get_mut(class) {
            *holds = holds.saturating_sub(1);
            if *holds == 0 {
                self.body_classes.remove(class);
            }
        }
    }

    fn upsert_style_rule(&mut self, rule_id: &str, css: &str) {
        self.style_rules.insert(rule_id.to_string(), css.to_string());
    }

    fn remove_style_rule(&mut self, rule_id: &str) {
        self.style_rules.remove(rule_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_operations_keep_parent_links_consistent() {
        let mut surface = MemorySurface::new();
        let a = surface.create_element("div");
        let b = surface.create_element("div");
        let child = surface.create_element("span");

        surface.append_child(a, child);
        surface.append_child(b, child);
        assert!(surface.element(a).expect("a").children().is_empty());
        assert_eq!(surface.element(b).expect("b").children(), &[child]);
        assert_eq!(surface.element(child).expect("child").parent(), Some(b));

        surface.remove_element(b);
        assert!(!surface.contains(child));
        assert_eq!(surface.element_count(), 1);
    }

    #[test]
    fn appending_an_ancestor_under_its_descendant_is_refused() {
        let mut surface = MemorySurface::new();
        let host = surface.create_host(300.0);
        let container = surface.create_element("div");
        let column = surface.create_element("div");
        surface.append_child(host, container);
        surface.append_child(container, column);

        surface.append_child(column, host);
        surface.append_child(column, container);
        surface.append_child(column, column);
        assert_eq!(surface.element(host).expect("host").parent(), None);
        assert_eq!(surface.element(container).expect("container").parent(), Some(host));
        assert!(surface.element(column).expect("column").children().is_empty());
        assert_eq!(surface.measured_width(column), 300.0);
    }

    #[test]
    fn classes_are_unique_and_toggle() {
        let mut surface = MemorySurface::new();
        let el = surface.create_element("div");
        surface.add_class(el, "column");
        surface.add_class(el, "column");
        surface.toggle_class(el, "resizer-visible", true);
        assert_eq!(surface.element(el).expect("el").classes().len(), 2);
        surface.toggle_class(el, "resizer-visible", false);
        assert!(!surface.element(el).expect("el").has_class("resizer-visible"));
    }

    #[test]
    fn percent_widths_measure_against_the_parent() {
        let mut surface = MemorySurface::new();
        let host = surface.create_host(400.0);
        let column = surface.create_element("div");
        surface.append_child(host, column);
        surface.set_measured_width(column, 200.0);
        assert_eq!(surface.measured_width(column), 200.0);

        surface.set_style_property(column, vars::COLUMN_WIDTH, "57.5%");
        assert_eq!(surface.measured_width(column), 230.0);
        surface.set_style_property(column, vars::COLUMN_WIDTH, "42.50%");
        assert_eq!(surface.measured_width(column), 170.0);

        surface.set_style_property(column, vars::COLUMN_WIDTH, "auto");
        assert_eq!(surface.measured_width(column), 200.0);

        let filler = surface.create_element("div");
        surface.append_child(host, filler);
        assert_eq!(surface.measured_width(filler), 400.0);
    }

    #[test]
    fn unknown_elements_are_ignored() {
        let mut surface = MemorySurface::new();
        let ghost = ElementId::new(99);
        surface.set_style_property(ghost, "color", "red");
        surface.add_class(ghost, "x");
        assert_eq!(surface.style_property(ghost, "color"), None);
        assert_eq!(surface.measured_width(ghost), 0.0);
    }

    #[test]
    fn body_classes_and_rules_are_addressed_by_name() {
        let mut surface = MemorySurface::new();
        surface.set_body_class("cursor-col-resize", true);
        assert!(surface.body_has_class("cursor-col-resize"));
        surface.set_body_class("cursor-col-resize", false);
        assert!(!surface.body_has_class("cursor-col-resize"));

        surface.hold_body_class("cursor-col-resize");
        surface.hold_body_class("cursor-col-resize");
        surface.release_body_class("cursor-col-resize");
        assert!(surface.body_has_class("cursor-col-resize"));
        surface.release_body_class("cursor-col-resize");
        surface.release_body_class("cursor-col-resize");
        assert!(!surface.body_has_class("cursor-col-resize"));

        surface.upsert_style_rule("r", "a");
        surface.upsert_style_rule("r", "b");
        assert_eq!(surface.style_rule("r"), Some("b"));
        assert_eq!(surface.style_rule_count(), 1);
        surface.remove_style_rule("r");
        assert_eq!(surface.style_rule("r"), None);
    }
}
