//! `Storage` implementations and the on-disk record codec.

pub mod codec;
pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
