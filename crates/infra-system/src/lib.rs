// Litmus Infrastructure - System Adapters
// Implements: OrchestrationEngine (Bolt CLI), InventoryLoader (YAML file)

pub mod bolt_engine;
pub mod inventory_file;

pub use bolt_engine::BoltCliEngine;
pub use inventory_file::YamlInventoryLoader;
