//! Session persistence contract
//!
//! The core never performs its own persistence; it talks to a
//! [`SessionStore`] through a narrow optimistic read/write contract.
//! [`MemorySessionStore`] is the in-process implementation used in tests
//! and by embedders that keep sessions in memory.

mod error;
mod memory;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemorySessionStore;
pub use traits::{SessionStore, Versioned};
