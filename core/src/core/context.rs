// src/core/context.rs

//! Boxed handler types stored by a [`Pipeline`](crate::Pipeline).

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Future returned by every stored handler.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler.
///
/// Takes a clone of the run's `ContextData<TData>` and resolves to the control
/// signal for the pipeline. Lock guards taken on the context must be dropped
/// before the handler awaits anything.
pub type Handler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// A compensation handler.
///
/// Registered on a step and invoked only when that step completed and a later
/// step failed. Its own error is logged and never replaces the original failure.
pub type Compensation<TData, Err> = Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<(), Err>> + Send + Sync>;
