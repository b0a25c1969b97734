//! Command implementations.
//!
//! - [`infer`] - build map of one manifest
//! - [`plan`] - bundle plans of one project
//! - [`targets`] - inferred targets of a workspace

pub mod infer;
pub mod plan;
pub mod targets;
pub(crate) mod utils;

pub use infer::execute as infer_execute;
pub use plan::execute as plan_execute;
pub use targets::execute as targets_execute;
