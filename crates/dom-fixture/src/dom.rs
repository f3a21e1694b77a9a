//! Arena document built from a [`Node`] tree.
//!
//! Nodes are stored in pre-order, so arena order is document order.

use crate::node::{ClickEffect, Node};
use crate::selector::{Combinator, Complex, Compound, Simple, SelectorList};

const NON_RENDERED: &[&str] = &["head", "title", "meta", "script", "style", "template", "link"];
const VOID: &[&str] = &["input", "img", "br", "meta", "link", "hr"];

#[derive(Debug, Clone)]
pub(crate) struct DomNode {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) value: String,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) on_click: Vec<ClickEffect>,
    pub(crate) fail_clicks: u32,
    pub(crate) clicks: u32,
    pub(crate) validation: Option<String>,
}

impl DomNode {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub(crate) fn set_flag(&mut self, name: &str, on: bool) {
        self.attrs.retain(|(k, _)| k != name);
        if on {
            self.attrs.push((name.to_string(), String::new()));
        }
    }

    pub(crate) fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }

    pub(crate) fn input_type(&self) -> &str {
        self.attr("type").unwrap_or("text")
    }

    fn style_hides(&self) -> bool {
        let Some(style) = self.attr("style") else {
            return false;
        };
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    }

    pub(crate) fn describe(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for key in ["id", "class", "name", "type"] {
            if let Some(v) = self.attr(key) {
                out.push_str(&format!(" {}=\"{}\"", key, v));
            }
        }
        out.push('>');
        out
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Document {
    pub(crate) nodes: Vec<DomNode>,
}

impl Document {
    pub(crate) fn from_root(root: &Node) -> Self {
        let mut doc = Document { nodes: Vec::new() };
        doc.push(root, None);
        doc
    }

    fn push(&mut self, node: &Node, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let value = node
            .value
            .clone()
            .or_else(|| {
                node.attrs
                    .iter()
                    .find(|(k, _)| k == "value")
                    .map(|(_, v)| v.clone())
            })
            .unwrap_or_default();
        self.nodes.push(DomNode {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            value,
            parent,
            children: Vec::new(),
            on_click: node.on_click.clone(),
            fail_clicks: node.fail_clicks,
            clicks: 0,
            validation: None,
        });
        for child in &node.children {
            let child_id = self.push(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    pub(crate) fn node(&self, id: usize) -> &DomNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: usize) -> &mut DomNode {
        &mut self.nodes[id]
    }

    /// Whitespace-collapsed text content of `id` and its descendants.
    pub(crate) fn text(&self, id: usize) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let node = self.node(id);
        if let Some(text) = &node.text {
            out.push(' ');
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Submitted value of an `<option>`: its `value` attribute, else its text.
    pub(crate) fn option_value(&self, id: usize) -> String {
        match self.node(id).attr("value") {
            Some(value) => value.to_string(),
            None => self.text(id),
        }
    }

    pub(crate) fn is_visible(&self, id: usize) -> bool {
        let node = self.node(id);
        if node.tag == "input" && node.input_type() == "hidden" {
            return false;
        }
        let mut cur = Some(id);
        while let Some(i) = cur {
            let n = self.node(i);
            if n.has_attr("hidden") || n.style_hides() || NON_RENDERED.contains(&n.tag.as_str()) {
                return false;
            }
            cur = n.parent;
        }
        true
    }

    pub(crate) fn is_enabled(&self, id: usize) -> bool {
        !self.node(id).has_attr("disabled")
    }

    pub(crate) fn title(&self) -> String {
        self.nodes
            .iter()
            .position(|n| n.tag == "title")
            .map(|id| self.text(id))
            .unwrap_or_default()
    }

    pub(crate) fn select(&self, list: &SelectorList) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|id| self.matches_list(*id, list))
            .collect()
    }

    pub(crate) fn matches_list(&self, id: usize, list: &SelectorList) -> bool {
        list.0.iter().any(|complex| self.matches_complex(id, complex))
    }

    fn matches_complex(&self, id: usize, complex: &Complex) -> bool {
        self.matches_parts(id, &complex.parts)
    }

    fn matches_parts(&self, id: usize, parts: &[(Combinator, Compound)]) -> bool {
        let Some(((combinator, compound), rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_compound(id, compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match combinator {
            Combinator::Child => self
                .node(id)
                .parent
                .map_or(false, |p| self.matches_parts(p, rest)),
            Combinator::Descendant => {
                let mut cur = self.node(id).parent;
                while let Some(p) = cur {
                    if self.matches_parts(p, rest) {
                        return true;
                    }
                    cur = self.node(p).parent;
                }
                false
            }
        }
    }

    fn matches_compound(&self, id: usize, compound: &Compound) -> bool {
        let node = self.node(id);
        if let Some(tag) = &compound.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        compound.simples.iter().all(|s| self.matches_simple(id, s))
    }

    fn matches_simple(&self, id: usize, simple: &Simple) -> bool {
        let node = self.node(id);
        match simple {
            Simple::Id(expected) => node.attr("id") == Some(expected.as_str()),
            Simple::Class(expected) => node
                .attr("class")
                .map_or(false, |c| c.split_whitespace().any(|w| w == expected)),
            Simple::Attr { name, op } => {
                let actual = if name == "value" && node.is_form_control() {
                    Some(node.value.as_str())
                } else {
                    node.attr(name)
                };
                match (actual, op) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(actual), Some((op, expected))) => op.matches(actual, expected),
                }
            }
            Simple::Not(inner) => !self.matches_list(id, inner),
            Simple::FirstChild => self.sibling_index(id) == Some(0),
            Simple::LastChild => match node.parent {
                Some(p) => self.node(p).children.last() == Some(&id),
                None => false,
            },
            Simple::NthChild(n) => self.sibling_index(id) == Some(n - 1),
            Simple::HasText(needle) => contains_ci(&self.text(id), needle),
            Simple::Disabled => node.has_attr("disabled"),
            Simple::Enabled => !node.has_attr("disabled"),
        }
    }

    fn sibling_index(&self, id: usize) -> Option<usize> {
        let parent = self.node(id).parent?;
        self.node(parent).children.iter().position(|c| *c == id)
    }

    /// Deepest rendered elements whose text matches.
    pub(crate) fn find_text(&self, content: &str, exact: bool) -> Vec<usize> {
        let hit = |id: usize| {
            let text = self.text(id);
            if exact {
                text == content.trim()
            } else {
                contains_ci(&text, content)
            }
        };
        (0..self.nodes.len())
            .filter(|id| !NON_RENDERED.contains(&self.node(*id).tag.as_str()))
            .filter(|id| hit(*id))
            .filter(|id| !self.node(*id).children.iter().any(|c| hit(*c)))
            .collect()
    }

    pub(crate) fn find_role(&self, role: &str, name: &str) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|id| {
                self.role_of(*id)
                    .map_or(false, |r| r.eq_ignore_ascii_case(role))
            })
            .filter(|id| name.trim().is_empty() || contains_ci(&self.accessible_name(*id), name))
            .collect()
    }

    fn role_of(&self, id: usize) -> Option<String> {
        let node = self.node(id);
        if let Some(role) = node.attr("role") {
            return Some(role.to_string());
        }
        let implicit = match node.tag.as_str() {
            "button" => "button",
            "a" if node.has_attr("href") => "link",
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
            "img" => "img",
            "nav" => "navigation",
            "select" => "combobox",
            "textarea" => "textbox",
            "ul" | "ol" => "list",
            "li" => "listitem",
            "input" => match node.input_type() {
                "number" => "spinbutton",
                "checkbox" => "checkbox",
                "radio" => "radio",
                "submit" | "button" => "button",
                "hidden" => return None,
                _ => "textbox",
            },
            _ => return None,
        };
        Some(implicit.to_string())
    }

    fn accessible_name(&self, id: usize) -> String {
        let node = self.node(id);
        node.attr("aria-label")
            .or_else(|| node.attr("alt"))
            .map(str::to_string)
            .or_else(|| {
                let text = self.text(id);
                (!text.is_empty()).then_some(text)
            })
            .or_else(|| node.attr("placeholder").map(str::to_string))
            .unwrap_or_default()
    }

    pub(crate) fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        if !self.nodes.is_empty() {
            self.write_html(0, &mut out);
        }
        out
    }

    fn write_html(&self, id: usize, out: &mut String) {
        let node = self.node(id);
        out.push('<');
        out.push_str(&node.tag);
        for (k, v) in &node.attrs {
            if k == "value" && node.is_form_control() {
                continue;
            }
            out.push_str(&format!(" {}=\"{}\"", k, escape(v, true)));
        }
        if node.is_form_control() && !node.value.is_empty() {
            out.push_str(&format!(" value=\"{}\"", escape(&node.value, true)));
        }
        out.push('>');
        if VOID.contains(&node.tag.as_str()) {
            return;
        }
        if let Some(text) = &node.text {
            out.push_str(&escape(text, false));
        }
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn escape(raw: &str, attr: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
