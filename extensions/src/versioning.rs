//! Version-change annotation blocks.
//!
//! ```text
//! /// version-added | v1
//! Info about addition.
//!
//! Other paragraph.
//! ///
//! ```
//!
//! renders as a bordered container whose first line is the colored label
//! followed by the first body paragraph:
//!
//! ```text
//! | Added in v1: Info about addition.
//! |
//! | Other paragraph.
//! ```

use mdblocks::block::{ArgumentMode, Block, BlockSpec, Options};
use mdblocks::{Element, Node};
use thiserror::Error;
use tracing::trace;

use crate::template;

/// The four annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Added,
    Changed,
    Deprecated,
    DeprecatedRemoved,
}

/// Per-variant constants.
#[derive(Debug)]
pub struct VariantInfo {
    pub spec: BlockSpec,
    /// Label template, see [`crate::template`].
    pub label: &'static str,
    /// CSS color of the border and the label.
    pub color: &'static str,
    pub min_args: usize,
}

const fn spec(name: &'static str) -> BlockSpec {
    BlockSpec {
        name,
        argument: ArgumentMode::Required,
        options: &[],
    }
}

static ADDED: VariantInfo = VariantInfo {
    spec: spec("version-added"),
    label: "Added in {arg[0]}",
    color: "rgb(79, 196, 100)",
    min_args: 1,
};

static CHANGED: VariantInfo = VariantInfo {
    spec: spec("version-changed"),
    label: "Changed in {arg[0]}",
    color: "rgb(244, 227, 76)",
    min_args: 1,
};

static DEPRECATED: VariantInfo = VariantInfo {
    spec: spec("version-deprecated"),
    label: "Deprecated in {arg[0]}",
    color: "rgb(244, 76, 78)",
    min_args: 1,
};

static DEPRECATED_REMOVED: VariantInfo = VariantInfo {
    spec: spec("deprecated-removed"),
    label: "Deprecated in {arg[0]}, will be removed in version {arg[1]}",
    color: "rgb(244, 76, 78)",
    min_args: 2,
};

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Added,
        Variant::Changed,
        Variant::Deprecated,
        Variant::DeprecatedRemoved,
    ];

    pub fn info(self) -> &'static VariantInfo {
        match self {
            Variant::Added => &ADDED,
            Variant::Changed => &CHANGED,
            Variant::Deprecated => &DEPRECATED,
            Variant::DeprecatedRemoved => &DEPRECATED_REMOVED,
        }
    }

    /// The block name this variant is registered under.
    pub fn name(self) -> &'static str {
        self.info().spec.name
    }

    pub fn from_name(name: &str) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// The argument had fewer tokens than the variant needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{block}' needs {required} argument token(s), got {found}")]
pub struct ValidationFailure {
    pub block: &'static str,
    pub required: usize,
    pub found: usize,
}

/// Split the block argument on whitespace and check the token count.
pub fn validate(variant: Variant, argument: &str) -> Result<Vec<String>, ValidationFailure> {
    let args: Vec<String> = argument.split_whitespace().map(String::from).collect();
    let info = variant.info();
    if args.len() < info.min_args {
        return Err(ValidationFailure {
            block: info.spec.name,
            required: info.min_args,
            found: args.len(),
        });
    }
    Ok(args)
}

/// Build `div > p > span` with the resolved label.
pub fn create_container(variant: Variant, args: &[String]) -> Element {
    let info = variant.info();
    let label = Element::new("span")
        .with_attr("style", format!("font-style: italic; color: {};", info.color))
        .with_text(template::render(info.label, args));
    let paragraph = Element::new("p").with_child(label);
    Element::new("div")
        .with_attr(
            "style",
            format!("border-left: .15rem solid {}; padding: 0 .5rem;", info.color),
        )
        .with_child(paragraph)
}

/// Merge the accumulated block content into the label paragraph of
/// `container` (a tree from [`create_container`]).
///
/// With fewer than two nodes the label gets a trailing period. Otherwise
/// the label ends with `": "` and the second node becomes an inline `span`
/// right after the label. Nodes from the third on follow the label
/// paragraph as siblings, in order. The first node is the leading slot and
/// is never relocated.
pub fn finalize(container: &mut Element, content: Vec<Node>) {
    let merge = content.len() >= 2;
    let Some(paragraph) = container.first_element_mut() else {
        return;
    };

    if let Some(label) = paragraph.first_element_mut() {
        label.push_text(if merge { ": " } else { "." });
    }
    if !merge {
        return;
    }

    let mut rest = content.into_iter().skip(1);
    if let Some(mut inline) = rest.next() {
        if let Node::Element(el) = &mut inline {
            el.tag = "span".to_string();
        }
        paragraph.push(inline);
    }
    container.children.extend(rest);
}

/// Block handler bound to one [`Variant`].
#[derive(Debug)]
pub struct VersionChange {
    variant: Variant,
    args: Vec<String>,
}

impl VersionChange {
    /// Panics when the variant's label references more arguments than its
    /// minimum count guarantees.
    pub fn new(variant: Variant) -> Self {
        let info = variant.info();
        assert!(
            template::arity(info.label) <= info.min_args,
            "label of '{}' uses {} argument(s) but only {} are required",
            info.spec.name,
            template::arity(info.label),
            info.min_args,
        );
        VersionChange {
            variant,
            args: Vec::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

impl Block for VersionChange {
    fn spec(&self) -> &BlockSpec {
        &self.variant.info().spec
    }

    fn on_validate(&mut self, argument: &str) -> bool {
        match validate(self.variant, argument) {
            Ok(args) => {
                self.args = args;
                true
            }
            Err(failure) => {
                trace!(%failure, "version block argument rejected");
                false
            }
        }
    }

    fn on_create(&mut self, _options: &Options) -> Element {
        create_container(self.variant, &self.args)
    }

    fn on_end(&mut self, block: &mut Element) {
        // The body was parsed into the container after the label paragraph,
        // so the accumulated sequence opens with that paragraph.
        let mut accumulated = std::mem::take(&mut block.children);
        if let Some(first) = accumulated.first_mut() {
            block.children.push(std::mem::replace(first, Node::Text(String::new())));
        }
        finalize(block, accumulated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn paragraph(text: &str) -> Node {
        let mut p = Element::new("p");
        if !text.is_empty() {
            p.set_text(text);
        }
        Node::Element(p)
    }

    fn label_text(container: &Element) -> String {
        container
            .element(0)
            .and_then(|p| p.element(0))
            .and_then(Element::text)
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn templates_fit_minimum_arguments() {
        for variant in Variant::ALL {
            let info = variant.info();
            assert!(template::arity(info.label) <= info.min_args, "{variant:?}");
        }
    }

    #[test]
    fn names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(Variant::from_name(variant.name()), Some(variant));
        }
        assert_eq!(Variant::from_name("version-removed"), None);
    }

    #[test]
    fn single_token_variants() {
        for variant in [Variant::Added, Variant::Changed, Variant::Deprecated] {
            assert_eq!(validate(variant, "v1").unwrap(), args("v1"));
            assert!(validate(variant, "").is_err());
            assert!(validate(variant, "   ").is_err());
        }
    }

    #[test]
    fn deprecated_removed_needs_two_tokens() {
        assert_eq!(
            validate(Variant::DeprecatedRemoved, "v1.5 v2.0").unwrap(),
            args("v1.5 v2.0")
        );
        let failure = validate(Variant::DeprecatedRemoved, "v1.5").unwrap_err();
        assert_eq!(failure.required, 2);
        assert_eq!(failure.found, 1);
        assert!(validate(Variant::DeprecatedRemoved, "").is_err());
    }

    #[test]
    fn container_structure() {
        let div = create_container(Variant::Added, &args("v2.0"));
        assert_eq!(
            div.to_string(),
            "<div style=\"border-left: .15rem solid rgb(79, 196, 100); padding: 0 .5rem;\">\
             <p><span style=\"font-style: italic; color: rgb(79, 196, 100);\">Added in v2.0</span></p></div>"
        );
    }

    #[test]
    fn scenario_a_no_content() {
        let mut div = create_container(Variant::Added, &args("v2.0"));
        finalize(&mut div, Vec::new());
        assert_eq!(label_text(&div), "Added in v2.0.");
    }

    #[test]
    fn scenario_b_deprecated_removed() {
        let mut div = create_container(Variant::DeprecatedRemoved, &args("v1.5 v2.0"));
        finalize(&mut div, Vec::new());
        assert_eq!(
            label_text(&div),
            "Deprecated in v1.5, will be removed in version v2.0."
        );
    }

    #[test]
    fn scenario_c_merges_second_child() {
        let mut div = create_container(Variant::Changed, &args("v3.1"));
        let content = vec![
            paragraph(""),
            paragraph("Now returns a list."),
            paragraph("See also X."),
        ];
        finalize(&mut div, content);

        assert_eq!(label_text(&div), "Changed in v3.1: ");
        assert_eq!(div.children.len(), 2);
        let p = div.element(0).unwrap();
        let tags: Vec<&str> = p.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["span", "span"]);
        assert_eq!(p.element(1).unwrap().text(), Some("Now returns a list."));
        let sibling = div.element(1).unwrap();
        assert_eq!(sibling.tag, "p");
        assert_eq!(sibling.text(), Some("See also X."));
        assert!(!div.to_string().contains("</p></p>"));
    }

    #[test]
    fn single_child_gets_a_period() {
        let mut div = create_container(Variant::Deprecated, &args("v1"));
        finalize(&mut div, vec![paragraph("lead")]);
        assert_eq!(label_text(&div), "Deprecated in v1.");
        assert_eq!(div.element(0).unwrap().children.len(), 1);
    }

    #[test]
    fn trailing_children_keep_order_and_structure() {
        let mut div = create_container(Variant::Added, &args("v1"));
        let list = Element::new("ul").with_child(Element::new("li").with_text("item"));
        let content = vec![
            paragraph(""),
            paragraph("first"),
            paragraph("second"),
            Node::Element(list.clone()),
            paragraph("third"),
        ];
        finalize(&mut div, content);

        let p = div.element(0).unwrap();
        assert_eq!(p.elements().count(), 2);
        assert_eq!(p.element(1).unwrap().text(), Some("first"));

        let tags: Vec<&str> = div.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["p", "p", "ul", "p"]);
        assert_eq!(div.element(1).unwrap().text(), Some("second"));
        assert_eq!(div.element(2), Some(&list));
        assert_eq!(div.element(3).unwrap().text(), Some("third"));
    }

    #[test]
    fn handler_rejects_short_argument() {
        let mut block = VersionChange::new(Variant::DeprecatedRemoved);
        assert!(!block.on_validate("v1"));
        assert!(block.on_validate("v1 v2"));
    }

    #[test]
    fn handler_merges_body_paragraph() {
        let mut block = VersionChange::new(Variant::Added);
        assert!(block.on_validate("v1"));
        let mut div = block.on_create(&Options::default());
        div.push(Element::new("p").with_text("Info about addition."));
        div.push(Element::new("p").with_text("Other paragraph."));
        block.on_end(&mut div);

        assert_eq!(
            div.element(0).unwrap().to_string(),
            "<p><span style=\"font-style: italic; color: rgb(79, 196, 100);\">Added in v1: </span>\
             <span>Info about addition.</span></p>"
        );
        assert_eq!(div.children.len(), 2);
        assert_eq!(div.element(1).unwrap().to_string(), "<p>Other paragraph.</p>");
    }

    #[test]
    fn handler_without_body_adds_period() {
        let mut block = VersionChange::new(Variant::Changed);
        assert!(block.on_validate("2.4"));
        let mut div = block.on_create(&Options::default());
        block.on_end(&mut div);
        assert_eq!(label_text(&div), "Changed in 2.4.");
        assert_eq!(div.children.len(), 1);
    }
}
