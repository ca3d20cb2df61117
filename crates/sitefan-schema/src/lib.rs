//! Plain data types shared by the sitefan crates. No I/O lives here.

pub mod archive;
pub mod types;

// Re-exports
pub use archive::*;
pub use types::*;
