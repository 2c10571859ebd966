mod html;

use std::fmt;

/// A rendered page: the top-level nodes produced from one markdown source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the top-level elements, skipping text and raw HTML.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }
}

/// A single node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, escaped on output.
    Text(String),
    /// Pre-rendered HTML copied verbatim from the markdown source.
    Raw(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated character data of this node and all its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Element(el) => el.text_content(),
            Node::Text(s) => s.clone(),
            Node::Raw(_) => String::new(),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// An HTML-like element. Attributes keep their insertion order so that
/// serialized output is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the leading text of this element, keeping element children.
    pub fn set_text(&mut self, text: impl Into<String>) {
        match self.children.first_mut() {
            Some(Node::Text(s)) => *s = text.into(),
            _ => self.children.insert(0, Node::Text(text.into())),
        }
    }

    /// Append character data to the leading text of this element.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.children.first_mut() {
            Some(Node::Text(s)) => s.push_str(&text),
            _ => self.children.insert(0, Node::Text(text)),
        }
    }

    /// The leading text of this element (what precedes the first child element).
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Insert a child at `index`, clamped to the current child count.
    pub fn insert(&mut self, index: usize, child: impl Into<Node>) {
        let index = index.min(self.children.len());
        self.children.insert(index, child.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements().nth(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .nth(index)
    }

    pub fn first_element_mut(&mut self) -> Option<&mut Element> {
        self.element_mut(0)
    }

    /// Depth-first search for the first descendant (or self) with `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.elements().find_map(|child| child.find(tag))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
            if node.as_element().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(el) => write!(f, "{}", el),
            Node::Text(s) => html::write_escaped_text(f, s),
            Node::Raw(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"", name)?;
            html::write_escaped_attr(f, value)?;
            write!(f, "\"")?;
        }
        write!(f, ">")?;

        if html::is_void(&self.tag) {
            return Ok(());
        }

        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = Element::new("div").with_attr("a", "1").with_attr("b", "2");
        el.set_attr("a", "3");
        assert_eq!(
            el.attributes,
            vec![("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn push_text_extends_leading_text() {
        let mut span = Element::new("span").with_text("Added in v1");
        span.push_text(".");
        assert_eq!(span.text(), Some("Added in v1."));
        assert_eq!(span.children.len(), 1);
    }

    #[test]
    fn set_text_keeps_child_elements() {
        let mut p = Element::new("p").with_child(Element::new("em"));
        p.set_text("hello ");
        assert_eq!(p.to_string(), "<p>hello <em></em></p>");
    }

    #[test]
    fn element_index_skips_text_nodes() {
        let p = Element::new("p")
            .with_text("a")
            .with_child(Element::new("em"))
            .with_child(Node::text("b"))
            .with_child(Element::new("strong"));
        assert_eq!(p.element(1).map(|e| e.tag.as_str()), Some("strong"));
    }

    #[test]
    fn serializes_void_elements_and_escapes() {
        let el = Element::new("p")
            .with_attr("title", "a \"b\" & c")
            .with_text("1 < 2")
            .with_child(Element::new("br"));
        assert_eq!(
            el.to_string(),
            "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2<br></p>"
        );
    }

    #[test]
    fn raw_nodes_are_not_escaped() {
        let doc = Document {
            nodes: vec![Node::Raw("<b>x</b>".into())],
        };
        assert_eq!(doc.to_string(), "<b>x</b>");
    }
}
