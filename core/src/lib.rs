// src/lib.rs

//! storeflow: asynchronous step pipelines for storefront workflows.
//!
//! A pipeline is an ordered list of named steps run against a shared
//! [`ContextData`]. Each step may carry:
//!  - `before`, `on` and `after` handlers, run in that order;
//!  - a skip condition evaluated against the context right before the step;
//!  - compensation handlers, run in reverse step order when a *later* step fails.
//!
//! Handlers return [`PipelineControl`] to continue or stop gracefully. A handler
//! error aborts the run, unwinds the compensations of every step that already
//! completed, and is returned unchanged to the caller.
//!
//! Pipelines are registered in a [`FlowRegistry`] keyed by their context type,
//! so request handlers only need to build a context and call `run`.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::{Compensation, Handler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
