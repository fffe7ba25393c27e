//! One task run: render, plan, delegate.
use crate::config::TaskConfig;
use crate::error::TaskError;
use crate::executor::{CommandExecutor, ScriptOutput};
use crate::planner::{build_execution_request, ExecutionRequest};
use crate::property::RunContext;
use crate::runner::TaskRunner;

pub struct RunTaskArgs<'a> {
    pub task: &'a TaskConfig,
    pub ctx: &'a RunContext,
    /// Runner built from `task.task_runner`, before cache configuration.
    pub runner: Box<dyn TaskRunner>,
    pub executor: &'a dyn CommandExecutor,
}

/// Renders and plans without executing anything.
pub fn plan_task(
    task: &TaskConfig,
    ctx: &RunContext,
    runner: Box<dyn TaskRunner>,
) -> Result<ExecutionRequest, TaskError> {
    let spec = task.render(ctx)?;
    Ok(build_execution_request(&spec, runner))
}

/// Plans the task and hands it to the executor. The executor's result is returned as-is.
pub async fn run_task(args: RunTaskArgs<'_>) -> Result<ScriptOutput, TaskError> {
    let RunTaskArgs {
        task,
        ctx,
        runner,
        executor,
    } = args;

    let request = plan_task(task, ctx, runner)?;
    tracing::info!(
        "starting task on runner '{}' ({} commands, {} output files)",
        request.runner.name(),
        request.commands.len(),
        request.output_files.len()
    );

    let output = executor.execute(request).await?;
    tracing::info!(
        "task finished: run_id={}, exit_code={}, output_files={}",
        output.run_id,
        output.exit_code,
        output.output_files.len()
    );
    Ok(output)
}
