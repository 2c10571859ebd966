//! `public-trace` block: embeds a public Logfire trace in an iframe.
//!
//! ```text
//! /// public-trace | https://logfire-eu.pydantic.dev/public-trace/abc
//!     title: Agent run
//!     caption: prepend
//! ///
//! ```

use mdblocks::block::{ArgumentMode, Block, BlockSpec, OptionKind, OptionSpec, Options};
use mdblocks::{Element, Node};
use thiserror::Error;
use tracing::trace;
use url::Url;

pub const NAME: &str = "public-trace";

/// Hosts serving public traces.
pub const TRACE_HOSTS: &[&str] = &["logfire-us.pydantic.dev", "logfire-eu.pydantic.dev"];

const LINK_EXTERNAL_16_PATH: &str = "M3.75 2h3.5a.75.75 0 0 1 0 1.5h-3.5a.25.25 0 0 0-.25.25v8.5c0 .138.112.25.25.25h8.5a.25.25 0 0 0 .25-.25v-3.5a.75.75 0 0 1 1.5 0v3.5A1.75 1.75 0 0 1 12.25 14h-8.5A1.75 1.75 0 0 1 2 12.25v-8.5C2 2.784 2.784 2 3.75 2m6.854-1h4.146a.25.25 0 0 1 .25.25v4.146a.25.25 0 0 1-.427.177L13.03 4.03 9.28 7.78a.75.75 0 0 1-1.042-.018.75.75 0 0 1-.018-1.042l3.75-3.75-1.543-1.543A.25.25 0 0 1 10.604 1";

static SPEC: BlockSpec = BlockSpec {
    name: NAME,
    argument: ArgumentMode::Required,
    options: &[
        OptionSpec {
            name: "title",
            default: "",
            kind: OptionKind::Text,
        },
        OptionSpec {
            name: "caption",
            default: "append",
            kind: OptionKind::OneOf(&["off", "append", "prepend"]),
        },
        OptionSpec {
            name: "loading",
            default: "lazy",
            kind: OptionKind::OneOf(&["lazy", "eager"]),
        },
    ],
};

#[derive(Debug, Error)]
pub enum TraceUrlError {
    #[error("could not parse {url} as an URL: {source}")]
    Unparsable {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0} is not a public trace URL")]
    NotPublicTrace(String),
}

/// Accept only URLs served from one of [`TRACE_HOSTS`].
pub fn validate_public_trace_url(value: &str) -> Result<Url, TraceUrlError> {
    let url = Url::parse(value).map_err(|source| TraceUrlError::Unparsable {
        url: value.to_string(),
        source,
    })?;
    match url.host_str() {
        Some(host) if TRACE_HOSTS.contains(&host) && url.port().is_none() => Ok(url),
        _ => Err(TraceUrlError::NotPublicTrace(value.to_string())),
    }
}

/// The iframe source: the trace URL with `embedded=true` added to its query.
pub fn embed_url(url: &Url) -> Url {
    let mut src = url.clone();
    let query = match url.query() {
        Some(q) if !q.is_empty() => format!("{q}&embedded=true"),
        _ => "embedded=true".to_string(),
    };
    src.set_query(Some(&query));
    src
}

fn external_link_icon() -> Element {
    let path = Element::new("path").with_attr("d", LINK_EXTERNAL_16_PATH);
    Element::new("svg")
        .with_attr("viewBox", "0 0 16 16")
        .with_attr("xmlns", "http://www.w3.org/2000/svg")
        .with_child(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Caption {
    Off,
    Append,
    Prepend,
}

impl Caption {
    fn from_option(value: &str) -> Caption {
        match value {
            "off" => Caption::Off,
            "prepend" => Caption::Prepend,
            _ => Caption::Append,
        }
    }
}

/// Block handler for `public-trace`.
#[derive(Debug, Default)]
pub struct PublicTrace {
    url: Option<Url>,
    /// The argument as written, used for the "View in Logfire" link.
    raw_url: String,
}

impl PublicTrace {
    pub fn new() -> Self {
        PublicTrace::default()
    }

    fn caption(&self, title: &str) -> Element {
        let mut p = Element::new("p");
        if !title.is_empty() {
            p.set_text(format!("{title} \u{2014} "));
        }
        let icon = Element::new("span")
            .with_attr("class", "twemoji")
            .with_child(external_link_icon());
        let link = Element::new("a")
            .with_attr("href", self.raw_url.as_str())
            .with_text("View in Logfire ")
            .with_child(icon);
        p.push(link);
        Element::new("figcaption").with_child(p)
    }
}

impl Block for PublicTrace {
    fn spec(&self) -> &BlockSpec {
        &SPEC
    }

    fn on_validate(&mut self, argument: &str) -> bool {
        match validate_public_trace_url(argument) {
            Ok(url) => {
                self.url = Some(url);
                self.raw_url = argument.to_string();
                true
            }
            Err(err) => {
                trace!(error = %err, "public trace rejected");
                false
            }
        }
    }

    fn on_create(&mut self, options: &Options) -> Element {
        let title = options.value("title");
        let caption = Caption::from_option(options.value("caption"));
        let loading = options.value("loading");

        let src = self
            .url
            .as_ref()
            .map(|url| embed_url(url).to_string())
            .unwrap_or_default();
        let mut iframe = Element::new("iframe")
            .with_attr("src", src)
            .with_attr("style", "aspect-ratio: 16 / 9; height: 100%; width: 100%;")
            .with_attr("loading", loading);
        if !title.is_empty() {
            iframe.set_attr("title", title);
        }

        let div = Element::new("div");
        if caption == Caption::Off {
            return div.with_child(iframe);
        }

        let mut figure = Element::new("figure")
            .with_attr("style", "width: 100%;")
            .with_child(iframe);
        let figcaption = self.caption(title);
        match caption {
            Caption::Prepend => figure.insert(0, figcaption),
            _ => figure.push(Node::Element(figcaption)),
        }
        div.with_child(figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "https://logfire-us.pydantic.dev/public-trace/abc?spanId=1";

    fn options(yaml: &str) -> Options {
        Options::resolve(NAME, SPEC.options, yaml).unwrap()
    }

    fn render(argument: &str, yaml: &str) -> Element {
        let mut block = PublicTrace::new();
        assert!(block.on_validate(argument));
        block.on_create(&options(yaml))
    }

    #[test]
    fn accepts_known_hosts_only() {
        assert!(validate_public_trace_url(TRACE).is_ok());
        assert!(validate_public_trace_url("https://logfire-eu.pydantic.dev/x").is_ok());
        assert!(matches!(
            validate_public_trace_url("https://example.com/public-trace/abc"),
            Err(TraceUrlError::NotPublicTrace(_))
        ));
        assert!(matches!(
            validate_public_trace_url("not a url"),
            Err(TraceUrlError::Unparsable { .. })
        ));
    }

    #[test]
    fn embed_url_extends_query() {
        let url = Url::parse(TRACE).unwrap();
        assert_eq!(
            embed_url(&url).as_str(),
            "https://logfire-us.pydantic.dev/public-trace/abc?spanId=1&embedded=true"
        );
        let bare = Url::parse("https://logfire-eu.pydantic.dev/t").unwrap();
        assert_eq!(embed_url(&bare).query(), Some("embedded=true"));
    }

    #[test]
    fn default_options_append_caption() {
        let div = render(TRACE, "");
        let figure = div.element(0).unwrap();
        assert_eq!(figure.tag, "figure");
        let tags: Vec<&str> = figure.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["iframe", "figcaption"]);

        let iframe = figure.element(0).unwrap();
        assert_eq!(iframe.attr("loading"), Some("lazy"));
        assert_eq!(iframe.attr("title"), None);

        let link = figure.find("a").unwrap();
        assert_eq!(link.attr("href"), Some(TRACE));
        assert_eq!(link.text(), Some("View in Logfire "));
        assert!(link.find("svg").is_some());
    }

    #[test]
    fn prepend_caption_with_title() {
        let div = render(TRACE, "title: Agent run\ncaption: prepend\nloading: eager");
        let figure = div.element(0).unwrap();
        assert_eq!(figure.element(0).unwrap().tag, "figcaption");
        assert_eq!(figure.find("iframe").unwrap().attr("title"), Some("Agent run"));
        assert_eq!(figure.find("iframe").unwrap().attr("loading"), Some("eager"));
        assert_eq!(figure.find("p").unwrap().text(), Some("Agent run \u{2014} "));
    }

    #[test]
    fn caption_off_has_no_figure() {
        let div = render(TRACE, "caption: off");
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.element(0).unwrap().tag, "iframe");
        assert!(div.find("figcaption").is_none());
    }

    #[test]
    fn rejects_foreign_url() {
        let mut block = PublicTrace::new();
        assert!(!block.on_validate("https://example.com/trace"));
    }
}
