pub mod error;
pub mod options;
pub mod registry;

use crate::document::Element;

pub use error::BlockError;
pub use options::{OptionKind, OptionSpec, OptionValue, Options};
pub use registry::BlockRegistry;

/// Whether a block header takes an argument after `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentMode {
    Required,
    Forbidden,
}

/// Static description of a block type: the name it is registered under,
/// its argument mode, and the options it accepts.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    pub name: &'static str,
    pub argument: ArgumentMode,
    pub options: &'static [OptionSpec],
}

/// A block extension handler. The host creates one instance per block
/// occurrence and drives it through its lifecycle exactly once:
///
/// 1. [`Block::on_validate`] with the raw argument string;
/// 2. [`Block::on_create`], returning the container element;
/// 3. the host parses the block body into the container;
/// 4. [`Block::on_end`] with the container holding the accumulated body.
pub trait Block {
    fn spec(&self) -> &BlockSpec;

    /// Returning `false` rejects the block: the host reports an error at
    /// the block header and drops it from the output.
    fn on_validate(&mut self, argument: &str) -> bool {
        let _ = argument;
        true
    }

    fn on_create(&mut self, options: &Options) -> Element;

    fn on_end(&mut self, block: &mut Element) {
        let _ = block;
    }
}

/// Lifecycle position of a single block instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Created,
    Validating,
    Rejected,
    Validated,
    Accumulating,
    Finalized,
}

impl BlockState {
    /// The only legal forward transitions. There is no retry path.
    pub fn can_advance_to(self, next: BlockState) -> bool {
        use BlockState::*;
        matches!(
            (self, next),
            (Created, Validating)
                | (Validating, Rejected)
                | (Validating, Validated)
                | (Validated, Accumulating)
                | (Accumulating, Finalized)
        )
    }
}
