// Port Layer - Interfaces for external dependencies

pub mod engine;
pub mod id_provider; // For deterministic testing
pub mod inventory_loader;
pub mod time_provider;

// Re-exports
pub use engine::{EngineConfig, EngineError, OrchestrationEngine};
pub use id_provider::IdProvider;
pub use inventory_loader::InventoryLoader;
pub use time_provider::TimeProvider;
