//! Tools module - capabilities exposed to the model
//!
//! Contains the tool trait, the registry, and the time lookup tool.

pub mod current_time;
pub mod registry;

pub use current_time::CurrentTimeTool;
pub use registry::{Tool, ToolRegistry};
