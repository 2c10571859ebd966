pub mod error;
pub mod fence;
pub mod markdown;

pub use error::ParseError;

use std::ops::Range;

use tracing::{debug, trace};

use crate::block::{ArgumentMode, Block, BlockError, BlockRegistry, BlockState, Options};
use crate::document::{Document, Element, Node};
use crate::parser::fence::{FenceHeader, Line};

/// The result of parsing one page. Block errors do not stop parsing: the
/// offending block is dropped and reported here.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(ParseError::is_error)
    }

    /// Treat any error diagnostic as fatal.
    pub fn into_result(self) -> Result<Document, Vec<ParseError>> {
        if self.has_errors() {
            Err(self.diagnostics)
        } else {
            Ok(self.document)
        }
    }
}

/// Parser entry point.
pub struct Parser<'r> {
    source: String,
    file_id: usize,
    registry: &'r BlockRegistry,
}

impl<'r> Parser<'r> {
    pub fn new(source: String, file_id: usize, registry: &'r BlockRegistry) -> Self {
        Parser {
            source,
            file_id,
            registry,
        }
    }

    /// Parse the markdown source, running registered blocks.
    pub fn parse(&self) -> Parsed {
        let mut nodes = Vec::new();
        let mut diagnostics = Vec::new();
        self.parse_range(0..self.source.len(), &mut nodes, &mut diagnostics);
        Parsed {
            document: Document { nodes },
            diagnostics,
        }
    }

    /// Parse `source[range]` and append the resulting nodes to `out`.
    fn parse_range(&self, range: Range<usize>, out: &mut Vec<Node>, diags: &mut Vec<ParseError>) {
        let lines = fence::lines(&self.source, range.clone());
        let mut markdown_start = range.start;
        let mut in_code = false;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if fence::is_code_fence(line.text) {
                in_code = !in_code;
            }
            let header = if in_code {
                None
            } else {
                fence::parse_header(line.text).filter(|h| self.registry.contains(h.name))
            };
            let Some(header) = header else {
                i += 1;
                continue;
            };

            self.flush_markdown(markdown_start..line.start, out);

            // Options: indented lines right after the header.
            let mut j = i + 1;
            while j < lines.len() && fence::is_option_line(lines[j].text) {
                j += 1;
            }
            let options_yaml = lines[i + 1..j]
                .iter()
                .map(|l| &l.text[4..])
                .collect::<Vec<_>>()
                .join("\n");

            // Body: up to the matching closing fence, or the end of the range.
            let body_start = lines.get(j).map_or(range.end, |l| l.start);
            let close = find_closing(&lines[j..], header.slashes).map(|k| j + k);
            let (body_end, resume) = match close {
                Some(k) => (lines[k].start, k + 1),
                None => {
                    diags.push(
                        ParseError::warning(
                            format!("block '{}' is never closed", header.name),
                            line.span(),
                            self.file_id,
                        )
                        .with_note(format!(
                            "close it with a line of {} slashes",
                            header.slashes
                        )),
                    );
                    (range.end, lines.len())
                }
            };

            if let Some(el) = self.run_block(&header, line, &options_yaml, body_start..body_end, diags) {
                out.push(Node::Element(el));
            }

            markdown_start = lines.get(resume).map_or(range.end, |l| l.start);
            i = resume;
        }

        self.flush_markdown(markdown_start..range.end, out);
    }

    fn flush_markdown(&self, range: Range<usize>, out: &mut Vec<Node>) {
        let text = &self.source[range];
        if !text.trim().is_empty() {
            out.extend(markdown::convert(text));
        }
    }

    /// Drive one block instance through its lifecycle.
    fn run_block(
        &self,
        header: &FenceHeader<'_>,
        line: Line<'_>,
        options_yaml: &str,
        body: Range<usize>,
        diags: &mut Vec<ParseError>,
    ) -> Option<Element> {
        let mut block = self.registry.create(header.name)?;
        let mut state = BlockState::Created;

        advance(&mut state, BlockState::Validating, header.name);
        let options = match validate(block.as_mut(), header.argument, options_yaml) {
            Ok(options) => options,
            Err(err) => {
                advance(&mut state, BlockState::Rejected, header.name);
                debug!(block = header.name, error = %err, "block rejected");
                diags.push(
                    ParseError::error(err.to_string(), line.span(), self.file_id)
                        .with_note("the block and its content were left out of the page"),
                );
                return None;
            }
        };
        advance(&mut state, BlockState::Validated, header.name);

        let mut container = block.on_create(&options);

        advance(&mut state, BlockState::Accumulating, header.name);
        self.parse_range(body, &mut container.children, diags);

        block.on_end(&mut container);
        advance(&mut state, BlockState::Finalized, header.name);

        Some(container)
    }
}

/// Host-side checks followed by the handler's own validation.
fn validate(block: &mut dyn Block, argument: &str, options_yaml: &str) -> Result<Options, BlockError> {
    let spec = block.spec();
    let name = spec.name;
    let option_specs = spec.options;

    match (spec.argument, argument.is_empty()) {
        (ArgumentMode::Required, true) => return Err(BlockError::MissingArgument { block: name }),
        (ArgumentMode::Forbidden, false) => return Err(BlockError::UnexpectedArgument { block: name }),
        _ => {}
    }

    let options = Options::resolve(name, option_specs, options_yaml)?;

    if !block.on_validate(argument) {
        return Err(BlockError::InvalidArgument {
            block: name,
            argument: argument.to_string(),
        });
    }
    Ok(options)
}

fn advance(state: &mut BlockState, next: BlockState, name: &str) {
    debug_assert!(state.can_advance_to(next), "{state:?} -> {next:?}");
    trace!(block = name, from = ?state, to = ?next, "block state");
    *state = next;
}

/// Index of the first line closing a block opened with `slashes`,
/// skipping lines inside fenced code.
fn find_closing(lines: &[fence::Line<'_>], slashes: usize) -> Option<usize> {
    let mut in_code = false;
    lines.iter().position(|l| {
        if fence::is_code_fence(l.text) {
            in_code = !in_code;
            return false;
        }
        !in_code && fence::is_closing(l.text, slashes)
    })
}
