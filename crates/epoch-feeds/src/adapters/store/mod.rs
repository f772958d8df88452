//! Storage Adapters
//!
//! Implementations of the `ChunkStore` trait.

mod file;
mod memory;
mod validating;

pub use file::FileChunkStore;
pub use memory::InMemoryChunkStore;
pub use validating::ValidatingStore;
