// src/registry.rs

//! `FlowRegistry<E>`: pipelines keyed by their context data type.
//!
//! Handlers in a registered pipeline may use their own error type as long as
//! the registry's `E` can be built from it.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineResult;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedPipeline<E>: Send + Sync
where
  E: std::error::Error + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E>;
}

struct TypedPipeline<TData, PErr, E>
where
  TData: 'static + Send + Sync,
  PErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, PErr>,
  _app_err: PhantomData<fn() -> E>,
}

#[async_trait]
impl<TData, PErr, E> ErasedPipeline<E> for TypedPipeline<TData, PErr, E>
where
  TData: 'static + Send + Sync,
  PErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  E: std::error::Error + From<PErr> + From<FlowError> + Send + Sync + 'static,
  Pipeline<TData, PErr>: Send + Sync,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(E::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(ctx_data).await.map_err(E::from)
  }
}

/// Type-keyed pipeline registry. At most one pipeline per context data type;
/// registering again replaces the previous one.
pub struct FlowRegistry<E = FlowError>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<E>>>>,
}

impl<E> FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  pub fn register_pipeline<TData, PErr>(&self, pipeline: Pipeline<TData, PErr>)
  where
    TData: 'static + Send + Sync,
    PErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    E: From<PErr>,
    Pipeline<TData, PErr>: Send + Sync,
  {
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<TData>(),
      steps = ?pipeline.step_names(),
      "Registering pipeline."
    );
    let typed = TypedPipeline::<TData, PErr, E> {
      pipeline,
      _app_err: PhantomData,
    };
    self.pipelines.write().insert(TypeId::of::<TData>(), Arc::new(typed));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  #[instrument(
    name = "FlowRegistry::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>())
  )]
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, E>
  where
    TData: 'static + Send + Sync,
  {
    // Clone the Arc out so the lock is released before awaiting.
    let runner = self.pipelines.read().get(&TypeId::of::<TData>()).cloned();
    let Some(runner) = runner else {
      let context_type = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %context_type, "No pipeline registered.");
      return Err(E::from(FlowError::NotRegistered { context_type }));
    };
    runner.run_erased(Box::new(ctx_data)).await
  }
}

impl<E> Default for FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
