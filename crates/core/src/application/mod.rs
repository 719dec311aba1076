// Application Layer - Harness use cases

pub mod harness;

// Re-exports
pub use harness::Harness;
