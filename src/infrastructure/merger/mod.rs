//! Suite merge adapters.

pub mod suite;

pub use suite::JunitSuiteMerger;
