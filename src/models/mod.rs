//! Core data models for tview
//!
//! Domain entities shared by the registry, navigation, execution and
//! layout components.

pub mod action;
pub mod environment;
pub mod execution_record;
pub mod mode;

// Re-exports for convenience
pub use action::Action;
pub use environment::Environment;
pub use execution_record::{execution_id, ExecutionRecord, ExecutionState, ProcessHandle};
pub use mode::Mode;
