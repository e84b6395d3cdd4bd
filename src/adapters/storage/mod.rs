//! Local persisted state
//!
//! The client remembers its session, filter and a patient cache between runs
//! through the [`KeyValueStore`] trait.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{load, save, KeyValueStore};
