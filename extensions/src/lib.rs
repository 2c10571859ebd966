pub mod public_trace;
pub mod template;
pub mod versioning;

use mdblocks::BlockRegistry;

pub use public_trace::PublicTrace;
pub use versioning::{Variant, VersionChange};

/// Register every block this crate provides.
pub fn register_all(registry: &mut BlockRegistry) {
    for variant in Variant::ALL {
        registry.register(variant.name(), move || Box::new(VersionChange::new(variant)));
    }
    registry.register(public_trace::NAME, || Box::new(PublicTrace::new()));
}

/// A registry holding all blocks from this crate.
pub fn registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();
    register_all(&mut registry);
    registry
}
