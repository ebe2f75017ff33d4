// Adapters layer: concrete project stores backing the engine.

pub mod memory;
pub mod snapshot;
