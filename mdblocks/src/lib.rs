pub mod block;
pub mod document;
pub mod parser;

pub use block::{Block, BlockRegistry, BlockSpec};
pub use document::{Document, Element, Node};
pub use parser::{ParseError, Parsed, Parser};

/// Parse `source` with the blocks in `registry`, using file id 0.
pub fn parse(source: &str, registry: &BlockRegistry) -> Parsed {
    Parser::new(source.to_string(), 0, registry).parse()
}
