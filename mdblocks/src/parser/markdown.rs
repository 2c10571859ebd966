use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::document::{Element, Node};

/// Tag used for containers whose children are spliced into the parent
/// when they close (HTML blocks, metadata, definition lists we don't model).
const TRANSPARENT: &str = "";

fn cmark_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Convert plain markdown (no extension blocks) into element-tree nodes.
pub fn convert(source: &str) -> Vec<Node> {
    let mut state = TreeBuilder::new();
    for event in CmarkParser::new_ext(source, cmark_options()) {
        state.event(event);
    }
    state.finish()
}

struct TreeBuilder {
    /// Open elements. The bottom entry is the synthetic root.
    stack: Vec<Element>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        TreeBuilder {
            stack: vec![Element::new(TRANSPARENT)],
            in_table_head: false,
        }
    }

    fn top(&mut self) -> &mut Element {
        // The root is never popped, see `close`.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str) {
        let top = self.top();
        match top.children.last_mut() {
            Some(Node::Text(s)) => s.push_str(text),
            _ => top.children.push(Node::Text(text.to_string())),
        }
    }

    fn open(&mut self, el: Element) {
        self.stack.push(el);
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(mut el) = self.stack.pop() else {
            return;
        };
        if el.tag == TRANSPARENT {
            self.top().children.append(&mut el.children);
            return;
        }
        if el.tag == "img" {
            let alt = el.text_content();
            el.children.clear();
            el.set_attr("alt", alt);
        }
        self.top().push(el);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag_end) => {
                // Tags that open two elements close two.
                match tag_end {
                    TagEnd::CodeBlock => {
                        self.close();
                        self.close();
                    }
                    TagEnd::TableHead => {
                        self.in_table_head = false;
                        self.close();
                        self.close();
                    }
                    _ => self.close(),
                }
            }
            Event::Text(s) => self.push_text(&s),
            Event::Code(s) => {
                let code = Element::new("code").with_text(s.to_string());
                self.top().push(code);
            }
            Event::Html(s) | Event::InlineHtml(s) => self.top().push(Node::Raw(s.to_string())),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.top().push(Element::new("br")),
            Event::Rule => self.top().push(Element::new("hr")),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.top().push(input);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let el = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading { level, id, .. } => {
                let mut h = Element::new(format!("h{}", heading_level_to_u8(&level)));
                if let Some(id) = id {
                    h.set_attr("id", id.to_string());
                }
                h
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::CodeBlock(kind) => {
                self.open(Element::new("pre"));
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(lang) = kind {
                    let lang = lang.split_whitespace().next().unwrap_or("");
                    if !lang.is_empty() {
                        code.set_attr("class", format!("language-{}", lang));
                    }
                }
                code
            }
            Tag::List(Some(start)) => {
                let mut ol = Element::new("ol");
                if start != 1 {
                    ol.set_attr("start", start.to_string());
                }
                ol
            }
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::Table(_) => Element::new("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.open(Element::new("thead"));
                Element::new("tr")
            }
            Tag::TableRow => Element::new("tr"),
            Tag::TableCell => Element::new(if self.in_table_head { "th" } else { "td" }),
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut a = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    a.set_attr("title", title.to_string());
                }
                a
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut img = Element::new("img").with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    img.set_attr("title", title.to_string());
                }
                img
            }
            _ => Element::new(TRANSPARENT),
        };
        self.open(el);
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.close();
        }
        std::mem::take(&mut self.stack[0].children)
    }
}

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
