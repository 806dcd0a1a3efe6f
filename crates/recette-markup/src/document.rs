//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Ids stay valid
//! for the lifetime of the document (and of every clone of it): replacing or
//! detaching a node unlinks it from its parent but never reuses its slot.

use crate::entities::{decode_entities, escape_attr_value};
use crate::tokenizer::{Token, Tokenizer};

/// Elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single `name="value"` pair. The value is kept exactly as written in the
/// source (entity-encoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: Option<String>,
}

impl Attribute {
    pub(crate) fn new(name: String, value: Option<String>) -> Self {
        Self { name, value }
    }

    /// Lowercase attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute value, `None` for boolean attributes.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// How an element ends in the serialized output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Closing {
    /// Closed by this exact source text.
    Explicit(String),
    /// Closed implicitly (by a parent closing or end of input); emits nothing.
    Implicit,
    /// Void element or `<x />`; emits nothing.
    None,
    /// Created programmatically; emits `</name>`.
    Generated,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<Attribute>,
    /// Source text of the opening tag, dropped once attributes change.
    raw_open: Option<String>,
    self_closing: bool,
    closing: Closing,
}

impl Element {
    /// Lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Raw value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }

    fn write_open(&self, out: &mut String) {
        if let Some(raw) = &self.raw_open {
            out.push_str(raw);
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }

    fn write_close(&self, out: &mut String) {
        match &self.closing {
            Closing::Explicit(raw) => out.push_str(raw),
            Closing::Generated => {
                out.push_str("</");
                out.push_str(&self.name);
                out.push('>');
            }
            Closing::Implicit | Closing::None => {}
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Document or fragment root.
    Root,
    Element(Element),
    /// Character data, entity-encoded exactly as it will be written out.
    Text(String),
    /// Full comment including delimiters.
    Comment(String),
    /// Declarations and unmatched closing tags, written verbatim.
    Raw(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed HTML document.
///
/// Parsing is lossless: for input whose tags are balanced (void elements and
/// the usual implicit `</p>`, `</li>`, `</td>` closes aside),
/// `Document::parse(s).render() == s`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses markup into a document.
    pub fn parse(input: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        doc.build_into(root, input);
        doc
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// The element at `id`, if that node is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Iterates over the ancestors of `id`, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// All nodes below `id` in document order (pre-order), excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Elements attached to the document, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// Attached elements whose `attr` equals `value` exactly.
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| self.element(id).and_then(|el| el.attr(attr)) == Some(value))
            .collect()
    }

    /// The first attached element with the given `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attr("id", id).into_iter().next()
    }

    /// Whether `id` is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Decoded text of the node and all of its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        decode_entities(&raw)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Root | NodeData::Element(_) => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
            NodeData::Comment(_) | NodeData::Raw(_) => {}
        }
    }

    /// Serialized markup of the node's children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized markup of the node itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serializes the whole document.
    pub fn render(&self) -> String {
        self.inner_html(self.root())
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Root => {
                for &child in &self.nodes[id.0].children {
                    self.write_node(child, out);
                }
            }
            NodeData::Element(el) => {
                el.write_open(out);
                for &child in &self.nodes[id.0].children {
                    self.write_node(child, out);
                }
                el.write_close(out);
            }
            NodeData::Text(s) | NodeData::Comment(s) | NodeData::Raw(s) => out.push_str(s),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    fn push_node(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Creates a detached element. Attribute values are plain text and are
    /// escaped on insertion.
    pub fn create_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let name = name.to_ascii_lowercase();
        let void = VOID_ELEMENTS.contains(&name.as_str());
        let element = Element {
            attrs: attrs
                .iter()
                .map(|(k, v)| Attribute::new(k.to_ascii_lowercase(), Some(escape_attr_value(v))))
                .collect(),
            name,
            raw_open: None,
            self_closing: false,
            closing: if void {
                Closing::None
            } else {
                Closing::Generated
            },
        };
        self.push_node(NodeData::Element(element), None)
    }

    /// Creates a detached text node. `raw` must already be entity-encoded.
    pub fn create_text(&mut self, raw: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(raw.into()), None)
    }

    /// Parses `markup` into detached nodes and returns the top-level ones.
    pub fn parse_fragment(&mut self, markup: &str) -> Vec<NodeId> {
        let holder = self.push_node(NodeData::Root, None);
        self.build_into(holder, markup);
        let top = std::mem::take(&mut self.nodes[holder.0].children);
        for &id in &top {
            self.nodes[id.0].parent = None;
        }
        top
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replaces the children of `id` with `children` (which are detached from
    /// wherever they were first).
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        for &child in &children {
            self.detach(child);
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes[id.0].children = children;
        if let Some(el) = self.element_mut(id) {
            if el.closing == Closing::None && el.self_closing {
                el.self_closing = false;
                el.raw_open = None;
                el.closing = Closing::Generated;
            }
        }
    }

    /// Puts `replacements` where `id` was and detaches `id`.
    ///
    /// Does nothing when `id` has no parent.
    pub fn replace(&mut self, id: NodeId, replacements: Vec<NodeId>) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        for &r in &replacements {
            self.detach(r);
            self.nodes[r.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.splice(pos..=pos, replacements);
        }
        self.nodes[id.0].parent = None;
    }

    /// Moves `id` inside the detached element `wrapper`, which takes its place.
    pub fn wrap(&mut self, id: NodeId, wrapper: NodeId) {
        if self.nodes[id.0].parent.is_none() {
            return;
        }
        self.replace(id, vec![wrapper]);
        self.set_children(wrapper, vec![id]);
    }

    /// Sets an attribute (plain-text value, escaped here), adding it if absent.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let escaped = escape_attr_value(value);
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) if attr.value.as_deref() == Some(escaped.as_str()) => return,
                Some(attr) => attr.value = Some(escaped),
                None => el
                    .attrs
                    .push(Attribute::new(name.to_ascii_lowercase(), Some(escaped))),
            }
            el.raw_open = None;
        }
    }

    // =========================================================================
    // Tree building
    // =========================================================================

    fn build_into(&mut self, container: NodeId, input: &str) {
        let mut stack: Vec<NodeId> = vec![container];

        for token in Tokenizer::new(input) {
            match token {
                Token::Text(text) => {
                    let top = *stack.last().unwrap_or(&container);
                    self.push_node(NodeData::Text(text.to_string()), Some(top));
                }
                Token::Comment(text) => {
                    let top = *stack.last().unwrap_or(&container);
                    self.push_node(NodeData::Comment(text.to_string()), Some(top));
                }
                Token::Declaration(text) => {
                    let top = *stack.last().unwrap_or(&container);
                    self.push_node(NodeData::Raw(text.to_string()), Some(top));
                }
                Token::OpenTag {
                    raw,
                    name,
                    attrs,
                    self_closing,
                } => {
                    while stack.len() > 1 {
                        let top = stack[stack.len() - 1];
                        let closes = self
                            .element(top)
                            .is_some_and(|el| implicitly_closed_by(el.name(), &name));
                        if !closes {
                            break;
                        }
                        stack.pop();
                    }
                    let void = VOID_ELEMENTS.contains(&name.as_str());
                    let element = Element {
                        name,
                        attrs,
                        raw_open: Some(raw.to_string()),
                        self_closing,
                        closing: if void || self_closing {
                            Closing::None
                        } else {
                            Closing::Implicit
                        },
                    };
                    let top = *stack.last().unwrap_or(&container);
                    let id = self.push_node(NodeData::Element(element), Some(top));
                    if !void && !self_closing {
                        stack.push(id);
                    }
                }
                Token::CloseTag { raw, name } => {
                    let matched = stack
                        .iter()
                        .skip(1)
                        .rposition(|&id| self.element(id).is_some_and(|el| el.name == name));
                    match matched {
                        Some(pos) => {
                            // `pos` indexes the stack without its container entry
                            let id = stack[pos + 1];
                            stack.truncate(pos + 1);
                            if let Some(el) = self.element_mut(id) {
                                el.closing = Closing::Explicit(raw.to_string());
                            }
                        }
                        None => {
                            let top = *stack.last().unwrap_or(&container);
                            self.push_node(NodeData::Raw(raw.to_string()), Some(top));
                        }
                    }
                }
            }
        }
    }
}

/// Whether an open `current` element is implicitly closed when `next` opens.
fn implicitly_closed_by(current: &str, next: &str) -> bool {
    match current {
        "p" => CLOSES_PARAGRAPH.contains(&next),
        "li" => next == "li",
        "dt" | "dd" => matches!(next, "dt" | "dd"),
        "td" | "th" => matches!(next, "td" | "th" | "tr"),
        "tr" => next == "tr",
        "option" => next == "option",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_render_is_lossless() {
        let input = concat!(
            "<!DOCTYPE html>\n<html><head><title>R&amp;D</title></head>\n",
            "<body class=\"x\"><p>Hello <span data-field='name'>N</span>!</p>",
            "<br><img src=\"a.png\"/><!-- c --></body></html>"
        );
        assert_eq!(Document::parse(input).render(), input);
    }

    #[test]
    fn implicit_paragraph_close_is_lossless() {
        let input = "<p>one<p>two<div>three</div>";
        let doc = Document::parse(input);
        assert_eq!(doc.render(), input);
        assert_eq!(doc.children(doc.root()).len(), 3);
    }

    #[test]
    fn stray_close_tag_is_preserved() {
        let input = "a</span>b";
        assert_eq!(Document::parse(input).render(), input);
    }

    #[test]
    fn find_by_attr_is_exact() {
        let doc = Document::parse(
            r#"<span data-field="nb_us">1</span><span data-field="nb_us_total">2</span>"#,
        );
        let found = doc.find_by_attr("data-field", "nb_us");
        assert_eq!(found.len(), 1);
        assert_eq!(doc.text_content(found[0]), "1");
    }

    #[test]
    fn text_content_decodes_entities() {
        let doc = Document::parse("<b>a &amp; b &lt;c&gt;</b>");
        let b = doc.elements()[0];
        assert_eq!(doc.text_content(b), "a & b <c>");
    }

    #[test]
    fn set_children_replaces_content() {
        let mut doc = Document::parse(r#"<ul data-list="r"><li>old</li></ul>"#);
        let ul = doc.find_by_attr("data-list", "r")[0];
        let items = doc.parse_fragment("<li>a</li><li>b</li>");
        doc.set_children(ul, items);
        assert_eq!(doc.render(), r#"<ul data-list="r"><li>a</li><li>b</li></ul>"#);
    }

    #[test]
    fn replace_swaps_node_in_place() {
        let mut doc = Document::parse("<div>a<p>x</p>b</div>");
        let p = doc.find_by_attr_name("p")[0];
        let new = doc.parse_fragment("<section>y</section>");
        doc.replace(p, new);
        assert_eq!(doc.render(), "<div>a<section>y</section>b</div>");
        assert!(!doc.is_attached(p));
    }

    #[test]
    fn wrap_moves_node_inside_wrapper() {
        let mut doc = Document::parse(r#"<td><span data-field="x">3</span></td>"#);
        let span = doc.find_by_attr("data-field", "x")[0];
        let a = doc.create_element("a", &[("href", "https://x?a=1&b=2")]);
        doc.wrap(span, a);
        assert_eq!(
            doc.render(),
            r#"<td><a href="https://x?a=1&amp;b=2"><span data-field="x">3</span></a></td>"#
        );
        assert_eq!(doc.parent(span), Some(a));
    }

    #[test]
    fn set_attr_rewrites_open_tag_only_when_changed() {
        let mut doc = Document::parse(r#"<a  href='x'>y</a>"#);
        let a = doc.elements()[0];
        doc.set_attr(a, "href", "x");
        assert_eq!(doc.render(), r#"<a  href='x'>y</a>"#);
        doc.set_attr(a, "href", "z");
        assert_eq!(doc.render(), r#"<a href="z">y</a>"#);
    }

    #[test]
    fn ids_survive_clone() {
        let doc = Document::parse(r#"<i data-field="a">1</i>"#);
        let id = doc.find_by_attr("data-field", "a")[0];
        let mut copy = doc.clone();
        let text = copy.create_text("2");
        copy.set_children(id, vec![text]);
        assert_eq!(copy.render(), r#"<i data-field="a">2</i>"#);
        assert_eq!(doc.render(), r#"<i data-field="a">1</i>"#);
    }

    impl Document {
        fn find_by_attr_name(&self, name: &str) -> Vec<NodeId> {
            self.elements()
                .into_iter()
                .filter(|&id| self.element(id).is_some_and(|el| el.name() == name))
                .collect()
        }
    }
}
