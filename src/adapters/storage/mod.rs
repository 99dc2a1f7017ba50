//! Session archive adapters.
//!
//! - `FsSessionArchive` - One JSON file per finalized session, written atomically
//! - `InMemorySessionArchive` - Map-backed archive for tests

mod fs_archive;
mod in_memory_archive;

pub use fs_archive::FsSessionArchive;
pub use in_memory_archive::InMemorySessionArchive;
