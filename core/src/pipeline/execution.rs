// src/pipeline/execution.rs

//! `Pipeline::run()`: step execution, graceful stop and compensation unwinding.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

enum StepOutcome {
  Completed,
  Skipped,
  Stopped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// On the first handler error the compensations of the already completed
  /// steps run in reverse order, then that error is returned.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      let outcome = self.run_step(step_def, &ctx_data).instrument(step_span).await;

      match outcome {
        Ok(StepOutcome::Completed) => completed.push(step_def.name.as_str()),
        Ok(StepOutcome::Skipped) => {}
        Ok(StepOutcome::Stopped) => return Ok(PipelineResult::Stopped),
        Err(e) => {
          self.unwind(&completed, &ctx_data).await;
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(
    &self,
    step_def: &StepDef<TData>,
    ctx_data: &ContextData<TData>,
  ) -> Result<StepOutcome, Err> {
    if let Some(skip_if) = &step_def.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped by its skip condition.");
        return Ok(StepOutcome::Skipped);
      }
    }

    if !self.has_handlers(&step_def.name) {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepOutcome::Skipped);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in [
      ("before", self.before.get(&step_def.name)),
      ("on", self.on.get(&step_def.name)),
      ("after", self.after.get(&step_def.name)),
    ] {
      if let Some(handlers) = handlers {
        if let PipelineControl::Stop = Self::run_phase(phase, handlers, ctx_data).await? {
          return Ok(StepOutcome::Stopped);
        }
      }
    }
    Ok(StepOutcome::Completed)
  }

  async fn run_phase(
    phase: &'static str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<PipelineControl, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, phase = phase, handler_index = handler_idx, "Pipeline stopped by handler.");
          return Ok(PipelineControl::Stop);
        }
        Err(e) => {
          event!(Level::ERROR, phase = phase, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PipelineControl::Continue)
  }

  async fn unwind(&self, completed: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensations) = self.compensations.get(*step_name) else {
        continue;
      };
      for compensation in compensations.iter().rev() {
        event!(Level::WARN, step_name = %step_name, "Running compensation.");
        if let Err(e) = compensation(ctx_data.clone()).await {
          event!(Level::ERROR, step_name = %step_name, error = %e, "Compensation failed.");
        }
      }
    }
  }
}
