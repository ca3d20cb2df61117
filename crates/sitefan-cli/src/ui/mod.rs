//! Console output for the `sitefan` binary.

pub mod output;

pub use output::Output;
